use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::iter::FusedIterator;
use std::mem::MaybeUninit;

use crate::gapbuffer::{GapBuffer, Geometry};
use crate::range::{Distance, Range};

/// A random access position in a [`GapBuffer`].
///
/// This works like a C++ random access iterator: it points at one element (or one past the end)
/// and can be moved forwards and backwards by any amount in O(1). Moving skips the gap. The
/// iterator borrows the buffer, so the buffer can't be edited while it exists. Use
/// [`cursor`](Self::cursor) to keep hold of a position across a call to one of the editing
/// methods.
///
/// For regular rust iteration, use [`GapBuffer::iter`] or turn a [`Range`] of two of these into
/// an iterator.
pub struct GapBufferIterator<'a, T> {
    storage: &'a [MaybeUninit<T>],
    // Physical index into storage. Never inside the gap.
    position: usize,
    geometry: Geometry,
    generation: u64,
}

impl<'a, T> GapBufferIterator<'a, T> {
    pub(crate) fn new(buffer: &'a GapBuffer<T>, position: usize) -> Self {
        let result = Self {
            storage: buffer.storage(),
            position,
            geometry: buffer.geometry(),
            generation: buffer.generation(),
        };
        debug_assert!(result.is_position_valid());
        result
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }

    fn is_position_valid(&self) -> bool {
        self.geometry.is_position_valid(self.position)
    }

    fn is_other_iterator_valid(&self, other: &Self) -> bool {
        std::ptr::eq(self.storage.as_ptr(), other.storage.as_ptr())
            && self.geometry == other.geometry
            && self.generation == other.generation
    }

    /// The element under the iterator.
    ///
    /// Panics if the iterator is at the end of the buffer.
    pub fn get(&self) -> &'a T {
        assert!(self.geometry.is_dereferenceable(self.position),
            "Dereferenced gap buffer iterator at {} (buffer size {})", self.position, self.geometry.buffer_size);
        let storage = self.storage;
        // Every slot outside the gap is initialized.
        unsafe { storage[self.position].assume_init_ref() }
    }

    /// The logical index of the element under the iterator.
    pub fn index(&self) -> usize {
        self.geometry.to_logical(self.position)
    }

    pub fn increment(&mut self) {
        let g = &self.geometry;
        if self.position + 1 == g.gap_position {
            debug_assert!(self.position < g.len());
            self.position += 1 + g.gap_size;
        } else {
            debug_assert!(self.position < g.buffer_size);
            self.position += 1;
        }
        debug_assert!(self.is_position_valid());
    }

    pub fn decrement(&mut self) {
        let g = &self.geometry;
        if self.position == g.gap_end() && g.gap_position > 0 {
            self.position -= 1 + g.gap_size;
        } else {
            debug_assert!(self.position > 0 && self.position != g.gap_end());
            self.position -= 1;
        }
        debug_assert!(self.is_position_valid());
    }

    /// Move by `count` elements in O(1). Equivalent to calling increment (or decrement, if count
    /// is negative) `count` times.
    pub fn advance(&mut self, count: isize) {
        if count == 0 { return; }

        let g = &self.geometry;
        let target = self.index() as isize + count;
        debug_assert!(target >= 0 && target as usize <= g.len(),
            "Advanced gap buffer iterator to {} (len {})", target, g.len());

        // Crossing the gap in either direction also crosses gap_size physical slots.
        // to_physical takes care of that.
        self.position = g.to_physical(target as usize);
        debug_assert!(self.is_position_valid());
    }

    /// Returns a copy of this iterator moved by `count` elements.
    pub fn offset(&self, count: isize) -> Self {
        let mut result = *self;
        result.advance(count);
        result
    }

    /// The number of elements between this iterator and `other`. Negative if other is earlier.
    pub fn distance_to(&self, other: &Self) -> isize {
        debug_assert!(self.is_other_iterator_valid(other));
        debug_assert!(self.is_position_valid());
        debug_assert!(other.is_position_valid());

        let g = &self.geometry;
        let raw = other.position as isize - self.position as isize;
        let is_before_gap = self.position < g.gap_position;
        let is_other_after_gap = other.position >= g.gap_end();
        let is_after_gap = self.position >= g.gap_end();
        let is_other_before_gap = other.position < g.gap_position;

        if is_before_gap && is_other_after_gap {
            raw - g.gap_size as isize
        } else if is_after_gap && is_other_before_gap {
            raw + g.gap_size as isize
        } else {
            raw
        }
    }

    /// Detach this position from the buffer borrow, so it can be handed to
    /// [`GapBuffer::insert_at`] and friends.
    pub fn cursor(&self) -> Cursor {
        Cursor {
            position: self.position,
            geometry: self.geometry,
            storage: self.storage.as_ptr() as usize,
            generation: self.generation,
        }
    }
}

impl<'a, T> Clone for GapBufferIterator<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, T> Copy for GapBufferIterator<'a, T> {}

impl<'a, T> Debug for GapBufferIterator<'a, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GapBufferIterator")
            .field("position", &self.position)
            .field("geometry", &self.geometry)
            .field("generation", &self.generation)
            .finish()
    }
}

impl<'a, T> PartialEq for GapBufferIterator<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        debug_assert!(self.is_other_iterator_valid(other));
        debug_assert!(self.is_position_valid());
        debug_assert!(other.is_position_valid());
        self.position == other.position
    }
}
impl<'a, T> Eq for GapBufferIterator<'a, T> {}

impl<'a, T> PartialOrd for GapBufferIterator<'a, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a, T> Ord for GapBufferIterator<'a, T> {
    fn cmp(&self, other: &Self) -> Ordering {
        debug_assert!(self.is_other_iterator_valid(other));
        // Physical order and logical order agree.
        self.position.cmp(&other.position)
    }
}

impl<'a, T> Distance for GapBufferIterator<'a, T> {
    fn distance_to(&self, other: &Self) -> isize {
        GapBufferIterator::distance_to(self, other)
    }
}

impl<'a, T> Range<GapBufferIterator<'a, T>> {
    /// Detach both ends of the range. See [`GapBufferIterator::cursor`].
    pub fn to_cursors(&self) -> Range<Cursor> {
        Range::new(self.begin().cursor(), self.end().cursor())
    }
}

/// A position in a [`GapBuffer`] which doesn't borrow the buffer.
///
/// Cursors are stamped with the buffer's generation. Any successful edit bumps the generation,
/// and the buffer will refuse to use a cursor made before that with
/// [`GapBufferError::StaleCursor`](crate::GapBufferError::StaleCursor).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    position: usize,
    geometry: Geometry,
    // Address of the buffer storage. Only used for identity, never dereferenced.
    storage: usize,
    generation: u64,
}

impl Cursor {
    /// The logical index this cursor points at.
    pub fn index(&self) -> usize {
        self.geometry.to_logical(self.position)
    }

    pub(crate) fn is_from(&self, storage: usize, generation: u64) -> bool {
        self.storage == storage && self.generation == generation
    }
}

impl Distance for Cursor {
    fn distance_to(&self, other: &Self) -> isize {
        debug_assert!(self.is_from(other.storage, other.generation));
        other.index() as isize - self.index() as isize
    }
}

/// Double ended iterator over the elements between two [`GapBufferIterator`]s.
pub struct Elements<'a, T> {
    front: GapBufferIterator<'a, T>,
    back: GapBufferIterator<'a, T>,
}

impl<'a, T> Iterator for Elements<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back { return None; }
        let item = self.front.get();
        self.front.increment();
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.front.distance_to(&self.back).max(0) as usize;
        (len, Some(len))
    }

    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        if n >= self.len() {
            self.front = self.back;
            return None;
        }
        self.front.advance(n as isize);
        self.next()
    }
}

impl<'a, T> DoubleEndedIterator for Elements<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back { return None; }
        self.back.decrement();
        Some(self.back.get())
    }
}

impl<'a, T> ExactSizeIterator for Elements<'a, T> {}
impl<'a, T> FusedIterator for Elements<'a, T> {}

impl<'a, T> Clone for Elements<'a, T> {
    fn clone(&self) -> Self {
        Self { front: self.front, back: self.back }
    }
}

impl<'a, T: Debug> Debug for Elements<'a, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, T> IntoIterator for Range<GapBufferIterator<'a, T>> {
    type Item = &'a T;
    type IntoIter = Elements<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        let (front, back) = self.into_inner();
        Elements { front, back }
    }
}
