use gapbuffer::{make_range, GapBuffer, GapBufferError};
use rand::prelude::*;
use rand::rngs::SmallRng;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

fn check(b: &GapBuffer<u8>, expected: &str) {
    b.check();
    assert_eq!(b.len(), expected.len());
    assert_eq!(b.to_vec(), expected.as_bytes());
    assert_eq!(b.iter().len(), expected.len());
}

fn random_word(rng: &mut SmallRng, len: usize) -> Vec<u8> {
    (0..len).map(|_| *ALPHABET.choose(rng).unwrap()).collect()
}

#[test]
fn empty_buffer_has_no_contents() {
    let mut b = GapBuffer::new();
    check(&b, "");

    b.insert("".bytes(), 0).unwrap();
    check(&b, "");

    b.remove(0, 0).unwrap();
    check(&b, "");
}

#[test]
fn insert_before_position() {
    let mut b = GapBuffer::new();
    b.insert("Hello World!".bytes(), 0).unwrap();
    check(&b, "Hello World!");
}

#[test]
fn insert_before_iterator() {
    let mut b = GapBuffer::new();
    let at = b.cbegin().cursor();
    b.insert_at("Hello World!".bytes(), at).unwrap();
    check(&b, "Hello World!");
}

#[test]
fn insert_hello_world() {
    let mut b = GapBuffer::new();
    b.append("world".bytes());
    check(&b, "world");

    b.insert("hello".bytes(), 0).unwrap();
    check(&b, "helloworld");

    let mut it = b.begin();
    it.advance(5);
    let at = it.cursor();
    b.insert_at(" ".bytes(), at).unwrap();
    check(&b, "hello world");
}

#[test]
fn insert_at_location() {
    let mut b = GapBuffer::new();

    b.insert("AAA".bytes(), 0).unwrap();
    check(&b, "AAA");

    b.insert("BBB".bytes(), 0).unwrap();
    check(&b, "BBBAAA");

    b.insert("CCC".bytes(), 6).unwrap();
    check(&b, "BBBAAACCC");

    b.insert("DDD".bytes(), 5).unwrap();
    check(&b, "BBBAADDDACCC");
}

#[test]
fn append() {
    let mut b = GapBuffer::new();
    b.append("Hello World!".bytes());
    check(&b, "Hello World!");
}

#[test]
fn remove_at_position() {
    let mut b = GapBuffer::new();
    b.append("Hello World!".bytes());
    b.remove(0, 12).unwrap();
    check(&b, "");

    // An emptied buffer keeps working like a new one.
    b.append("again".bytes());
    check(&b, "again");
}

#[test]
fn remove_at_iterator() {
    let mut b = GapBuffer::new();
    b.append("Hello World!".bytes());
    let everything = make_range(b.cbegin(), b.cend()).to_cursors();
    b.remove_range(everything).unwrap();
    check(&b, "");
}

#[test]
fn replace_at_position() {
    let mut b = GapBuffer::new();
    b.append("Hello World!".bytes());
    b.replace(0, 12, "Goodbye World!".bytes()).unwrap();
    check(&b, "Goodbye World!");
}

#[test]
fn replace_at_iterator() {
    let mut b = GapBuffer::new();
    b.append("Hello World!".bytes());
    let everything = make_range(b.cbegin(), b.cend()).to_cursors();
    b.replace_range(everything, "Goodbye World!".bytes()).unwrap();
    check(&b, "Goodbye World!");
}

#[test]
fn size() {
    let mut b = GapBuffer::new();
    b.append("Hello World!".bytes());
    assert_eq!(b.size(), 12);
    assert_eq!(b.len(), 12);
}

#[test]
fn out_of_range_leaves_content_alone() {
    let mut b = GapBuffer::new();
    b.append("Hello".bytes());
    b.remove(2, 0).unwrap();

    let len = b.len();
    assert_eq!(b.insert("x".bytes(), len + 1), Err(GapBufferError::PositionOutOfBounds { position: 6, len: 5 }));
    assert!(b.remove(len + 1, 0).is_err());
    assert!(b.remove(0, len + 1).is_err());
    check(&b, "Hello");
}

fn random_edits_once(seed: u64, steps: usize, verbose: bool) {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut b = GapBuffer::new();
    let mut expected: Vec<u8> = Vec::new();

    for i in 0..steps {
        let len = expected.len();
        let word_len = rng.gen_range(0..=7);
        let word = random_word(&mut rng, word_len);
        if verbose { println!("{} len {}", i, len); }

        match rng.gen_range(0..9) {
            0 => {
                let pos = rng.gen_range(0..=len);
                b.insert(word.iter().copied(), pos).unwrap();
                expected.splice(pos..pos, word);
            }
            1 => {
                b.insert(word.iter().copied(), 0).unwrap();
                expected.splice(0..0, word);
            }
            2 => {
                b.append(word.iter().copied());
                expected.extend_from_slice(&word);
            }
            3 => {
                let pos = rng.gen_range(0..=len);
                let at = b.begin().offset(pos as isize).cursor();
                b.insert_at(word.iter().copied(), at).unwrap();
                expected.splice(pos..pos, word);
            }
            4 => {
                let pos = rng.gen_range(0..=len);
                let count = rng.gen_range(0..=(len - pos).min(10));
                b.remove(pos, count).unwrap();
                expected.drain(pos..pos + count);
            }
            5 => {
                let count = rng.gen_range(0..=len.min(10));
                b.remove(len - count, count).unwrap();
                expected.truncate(len - count);
            }
            6 => {
                let pos = rng.gen_range(0..=len);
                let count = rng.gen_range(0..=(len - pos).min(10));
                b.replace(pos, count, word.iter().copied()).unwrap();
                expected.splice(pos..pos + count, word);
            }
            7 => {
                let pos = rng.gen_range(0..=len);
                let count = rng.gen_range(0..=(len - pos).min(10));
                let range = make_range(b.begin().offset(pos as isize), b.begin().offset((pos + count) as isize));
                let range = range.to_cursors();
                b.replace_range(range, word.iter().copied()).unwrap();
                expected.splice(pos..pos + count, word);
            }
            _ => {
                // Should all be rejected without changing anything.
                assert!(b.insert(word.iter().copied(), len + 1).is_err());
                assert!(b.remove(len + 1, 0).is_err());
                assert!(b.remove(0, len + 1).is_err());
            }
        }

        b.check();
        assert_eq!(b.len(), expected.len());
        assert_eq!(b, *expected.as_slice());
        assert!(b.iter().eq(expected.iter()));
        assert!(b.iter().rev().eq(expected.iter().rev()));
    }
}

#[test]
fn random_edits() {
    random_edits_once(123, 2000, false);
}

#[test]
fn random_edits_many_seeds() {
    for seed in 0..20 {
        random_edits_once(seed, 300, false);
    }
}

#[test]
#[ignore]
fn random_edits_forever() {
    for seed in 0.. {
        if seed % 100 == 0 { println!("seed {}", seed); }
        random_edits_once(seed, 1000, false);
    }
}
