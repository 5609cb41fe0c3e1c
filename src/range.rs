/// Something which can measure how many steps it takes to reach another value of the same type.
///
/// This is what lets a [`Range`] report its size. It is implemented for gap buffer iterators,
/// detached cursors and plain indexes.
pub trait Distance {
    /// Number of increments needed to get from `self` to `other`. Negative if `other` is before
    /// `self`.
    fn distance_to(&self, other: &Self) -> isize;
}

impl Distance for usize {
    fn distance_to(&self, other: &Self) -> isize {
        *other as isize - *self as isize
    }
}

/// A half open `[first, last)` span described by two iterators into the same sequence.
///
/// Range doesn't own anything and doesn't check anything. Its used to describe elements being
/// passed into or taken out of a [`GapBuffer`](crate::GapBuffer).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range<I> {
    first: I,
    last: I,
}

impl<I> Range<I> {
    pub fn new(first: I, last: I) -> Self {
        Self { first, last }
    }

    pub fn begin(&self) -> &I { &self.first }
    pub fn end(&self) -> &I { &self.last }

    pub fn into_inner(self) -> (I, I) {
        (self.first, self.last)
    }
}

impl<I: Distance> Range<I> {
    /// The distance from begin to end. This isn't guarded - a backwards range has a negative size.
    pub fn size(&self) -> isize {
        self.first.distance_to(&self.last)
    }
}

pub fn make_range<I>(first: I, last: I) -> Range<I> {
    Range::new(first, last)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_range_size() {
        let r = make_range(3usize, 10);
        assert_eq!(r.size(), 7);
        assert_eq!(*r.begin(), 3);
        assert_eq!(*r.end(), 10);

        // Not validated.
        let backwards = Range::new(10usize, 3);
        assert_eq!(backwards.size(), -7);
    }

    #[test]
    fn default_is_empty() {
        let r: Range<usize> = Range::default();
        assert_eq!(r.size(), 0);
        assert_eq!(r.into_inner(), (0, 0));
    }
}
