use std::fmt::{Debug, Display, Formatter};
use std::mem::MaybeUninit;
use std::ops::{Index, IndexMut};
use std::ptr;

use log::{debug, trace};

use crate::iter::{Cursor, Elements, GapBufferIterator};
use crate::range::Range;
use crate::{GapBufferError, Result};

/// The shape of a gap buffer's storage at some moment. Iterators and cursors carry a copy of this
/// so they can map between logical and physical positions without touching the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Geometry {
    pub(crate) buffer_size: usize,
    pub(crate) gap_position: usize,
    pub(crate) gap_size: usize,
}

impl Geometry {
    pub(crate) fn gap_end(&self) -> usize {
        self.gap_position + self.gap_size
    }

    pub(crate) fn len(&self) -> usize {
        self.buffer_size - self.gap_size
    }

    pub(crate) fn to_physical(&self, index: usize) -> usize {
        if index < self.gap_position { index } else { index + self.gap_size }
    }

    pub(crate) fn to_logical(&self, position: usize) -> usize {
        if position < self.gap_position { position } else { position - self.gap_size }
    }

    fn in_gap(&self, position: usize) -> bool {
        position >= self.gap_position && position < self.gap_end()
    }

    /// Positions an iterator may rest on: any live slot, plus the end sentinel.
    pub(crate) fn is_position_valid(&self, position: usize) -> bool {
        position == self.buffer_size || (position < self.buffer_size && !self.in_gap(position))
    }

    pub(crate) fn is_dereferenceable(&self, position: usize) -> bool {
        position < self.buffer_size && !self.in_gap(position)
    }
}

/// A growable gap buffer holding elements of type T.
///
/// The elements live in one contiguous allocation, split in two by a single run of unused slots
/// (the gap). Edits happen at the gap, so a sequence of edits near the same place only moves the
/// handful of elements between the old and new edit points.
///
/// ```
/// use gapbuffer::GapBuffer;
///
/// let mut buffer = GapBuffer::new();
/// buffer.append("world".bytes());
/// buffer.insert("hello ".bytes(), 0).unwrap();
/// assert_eq!(buffer, *b"hello world".as_slice());
/// ```
pub struct GapBuffer<T> {
    // Slots in [gap_position, gap_position + gap_size) are uninitialized. Everything else is live.
    data: Box<[MaybeUninit<T>]>,

    gap_position: usize,
    gap_size: usize,

    // Bumped by every successful mutation. Used to reject stale cursors.
    generation: u64,
}

#[inline]
unsafe fn slice_assume_init<T>(slice: &[MaybeUninit<T>]) -> &[T] {
    &*(slice as *const [MaybeUninit<T>] as *const [T])
}

#[inline]
unsafe fn slice_assume_init_mut<T>(slice: &mut [MaybeUninit<T>]) -> &mut [T] {
    &mut *(slice as *mut [MaybeUninit<T>] as *mut [T])
}

fn alloc_storage<T>(size: usize) -> Box<[MaybeUninit<T>]> {
    std::iter::repeat_with(MaybeUninit::uninit).take(size).collect()
}

#[cold]
fn capacity_overflow() -> ! {
    panic!("GapBuffer capacity overflow");
}

impl<T> GapBuffer<T> {
    pub fn new() -> Self {
        Self {
            data: alloc_storage(0),
            gap_position: 0,
            gap_size: 0,
            generation: 0,
        }
    }

    /// Create an empty buffer with room for `capacity` elements before it needs to reallocate.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: alloc_storage(capacity),
            gap_position: 0,
            gap_size: capacity,
            generation: 0,
        }
    }

    /// Number of elements in the buffer. The gap isn't counted.
    pub fn len(&self) -> usize {
        self.data.len() - self.gap_size
    }

    /// Alias for [`len`](Self::len).
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of physical slots, including the gap.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn geometry(&self) -> Geometry {
        Geometry {
            buffer_size: self.data.len(),
            gap_position: self.gap_position,
            gap_size: self.gap_size,
        }
    }

    pub(crate) fn storage(&self) -> &[MaybeUninit<T>] {
        &self.data
    }

    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Insert elements before logical `position`. Fails without modifying the buffer if
    /// `position > len()`.
    pub fn insert<E>(&mut self, elements: E, position: usize) -> Result<()>
    where
        E: IntoIterator<Item = T>,
        E::IntoIter: ExactSizeIterator,
    {
        self.validate_position(position)?;
        self.insert_unchecked(elements.into_iter(), position);
        Ok(())
    }

    /// Insert elements before the element the cursor points at.
    pub fn insert_at<E>(&mut self, elements: E, cursor: Cursor) -> Result<()>
    where
        E: IntoIterator<Item = T>,
        E::IntoIter: ExactSizeIterator,
    {
        let position = self.cursor_index(&cursor)?;
        self.insert(elements, position)
    }

    /// Insert elements at the end of the buffer.
    pub fn append<E>(&mut self, elements: E)
    where
        E: IntoIterator<Item = T>,
        E::IntoIter: ExactSizeIterator,
    {
        self.insert_unchecked(elements.into_iter(), self.len());
    }

    fn insert_unchecked<I: ExactSizeIterator<Item = T>>(&mut self, elements: I, position: usize) {
        let count = elements.len();

        self.move_gap(position);
        self.expand_gap(count);
        self.generation += 1;

        // The gap is only guaranteed to fit `count` items, so never take more than that even if
        // the iterator lied about its length. Each item shrinks the gap as it lands so the buffer
        // stays consistent if the iterator panics.
        for item in elements.take(count) {
            self.data[self.gap_position].write(item);
            self.gap_position += 1;
            self.gap_size -= 1;
        }

        self.debug_check();
    }

    /// Remove `count` elements starting at logical `position`. The removed elements are dropped.
    pub fn remove(&mut self, position: usize, count: usize) -> Result<()> {
        self.validate_position(position)?;
        self.validate_position(position.saturating_add(count))?;

        self.move_gap(position);
        self.generation += 1;

        let start = self.gap_position + self.gap_size;
        // Grow the gap before dropping so a panicking destructor can't cause a double drop.
        self.gap_size += count;
        unsafe {
            ptr::drop_in_place(slice_assume_init_mut(&mut self.data[start..start + count]));
        }

        self.debug_check();
        Ok(())
    }

    /// Remove the elements in the range. Both cursors must come from this buffer's current state.
    pub fn remove_range(&mut self, range: Range<Cursor>) -> Result<()> {
        let (position, count) = self.range_span(&range)?;
        self.remove(position, count)
    }

    /// Remove `count` elements at `position`, then insert the new elements in their place.
    pub fn replace<E>(&mut self, position: usize, count: usize, elements: E) -> Result<()>
    where
        E: IntoIterator<Item = T>,
        E::IntoIter: ExactSizeIterator,
    {
        self.remove(position, count)?;
        self.insert(elements, position)
    }

    pub fn replace_range<E>(&mut self, range: Range<Cursor>, elements: E) -> Result<()>
    where
        E: IntoIterator<Item = T>,
        E::IntoIter: ExactSizeIterator,
    {
        let (position, count) = self.range_span(&range)?;
        self.replace(position, count, elements)
    }

    fn validate_position(&self, position: usize) -> Result<()> {
        let len = self.len();
        if position > len {
            debug!("Rejecting position {} in gap buffer of length {}", position, len);
            Err(GapBufferError::PositionOutOfBounds { position, len })
        } else {
            Ok(())
        }
    }

    fn cursor_index(&self, cursor: &Cursor) -> Result<usize> {
        let storage = self.data.as_ptr() as usize;
        if cursor.is_from(storage, self.generation) {
            Ok(cursor.index())
        } else {
            debug!("Rejecting stale cursor (buffer generation {})", self.generation);
            Err(GapBufferError::StaleCursor)
        }
    }

    fn range_span(&self, range: &Range<Cursor>) -> Result<(usize, usize)> {
        let start = self.cursor_index(range.begin())?;
        let end = self.cursor_index(range.end())?;
        if end < start {
            Err(GapBufferError::ReversedRange { start, end })
        } else {
            Ok((start, end - start))
        }
    }

    fn move_gap(&mut self, new_gap_position: usize) {
        let current = self.gap_position;
        if new_gap_position == current { return; }

        let gap_size = self.gap_size;
        debug_assert!(new_gap_position <= self.len());
        trace!("Moving gap from {} to {}", current, new_gap_position);

        let p = self.data.as_mut_ptr();
        unsafe {
            if new_gap_position < current {
                // Move elements to the right (gap to the left)
                ptr::copy(p.add(new_gap_position), p.add(new_gap_position + gap_size), current - new_gap_position);
            } else {
                // Move elements to the left (gap to the right)
                ptr::copy(p.add(current + gap_size), p.add(current), new_gap_position - current);
            }
        }

        self.gap_position = new_gap_position;
    }

    fn expand_gap(&mut self, min_gap_size: usize) {
        if self.gap_size >= min_gap_size { return; }

        let len = self.len();
        let buffer_size = self.data.len();
        let min_buffer_size = len.checked_add(min_gap_size).unwrap_or_else(|| capacity_overflow());

        let mut new_buffer_size = buffer_size.max(1);
        while new_buffer_size <= min_buffer_size {
            new_buffer_size = new_buffer_size.checked_mul(2).unwrap_or_else(|| capacity_overflow());
        }
        let new_gap_size = new_buffer_size - len;
        debug!("Growing gap buffer from {} to {} slots", buffer_size, new_buffer_size);

        let mut new_data = alloc_storage::<T>(new_buffer_size);
        let prefix_len = self.gap_position;
        let suffix_len = len - prefix_len;

        unsafe {
            let src = self.data.as_ptr();
            let dest = new_data.as_mut_ptr();
            ptr::copy_nonoverlapping(src, dest, prefix_len);
            ptr::copy_nonoverlapping(
                src.add(prefix_len + self.gap_size),
                dest.add(prefix_len + new_gap_size),
                suffix_len
            );
        }

        // The old storage is MaybeUninit, so dropping it only frees the allocation. The elements
        // now belong to new_data.
        self.data = new_data;
        self.gap_size = new_gap_size;
    }

    /// An iterator positioned at the first element.
    pub fn begin(&self) -> GapBufferIterator<'_, T> {
        // If the gap is at the very front, element 0 lives just after it.
        let position = if self.gap_position == 0 { self.gap_size } else { 0 };
        GapBufferIterator::new(self, position)
    }

    /// An iterator positioned one past the last element.
    pub fn end(&self) -> GapBufferIterator<'_, T> {
        GapBufferIterator::new(self, self.data.len())
    }

    pub fn cbegin(&self) -> GapBufferIterator<'_, T> { self.begin() }
    pub fn cend(&self) -> GapBufferIterator<'_, T> { self.end() }

    pub fn iter(&self) -> Elements<'_, T> {
        Range::new(self.begin(), self.end()).into_iter()
    }

    /// The elements before and after the gap.
    pub fn as_slices(&self) -> (&[T], &[T]) {
        let gap_end = self.gap_position + self.gap_size;
        unsafe {
            (
                slice_assume_init(&self.data[..self.gap_position]),
                slice_assume_init(&self.data[gap_end..]),
            )
        }
    }

    pub fn as_mut_slices(&mut self) -> (&mut [T], &mut [T]) {
        let gap_end = self.gap_position + self.gap_size;
        let (start, rest) = self.data.split_at_mut(self.gap_position);
        unsafe {
            (
                slice_assume_init_mut(start),
                slice_assume_init_mut(&mut rest[gap_end - self.gap_position..]),
            )
        }
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len() { return None; }
        let position = self.geometry().to_physical(index);
        Some(unsafe { self.data[position].assume_init_ref() })
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index >= self.len() { return None; }
        let position = self.geometry().to_physical(index);
        Some(unsafe { self.data[position].assume_init_mut() })
    }

    pub fn to_vec(&self) -> Vec<T> where T: Clone {
        let (start, end) = self.as_slices();
        let mut result = Vec::with_capacity(self.len());
        result.extend_from_slice(start);
        result.extend_from_slice(end);
        result
    }

    /// Check the internal invariants. Panics if any of them are broken.
    pub fn check(&self) {
        let geometry = self.geometry();
        assert!(geometry.gap_end() <= geometry.buffer_size);
        assert!(self.gap_position <= self.len());
        assert_eq!(geometry.len() + self.gap_size, self.data.len());

        assert!(geometry.is_position_valid(self.begin().position()));
        assert_eq!(self.begin().distance_to(&self.end()), self.len() as isize);
        assert_eq!(geometry.to_physical(self.len()), self.data.len());
    }

    fn debug_check(&self) {
        if cfg!(debug_assertions) {
            self.check();
        }
    }
}

impl<T> Default for GapBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for GapBuffer<T> {
    fn drop(&mut self) {
        let (start, end) = self.as_mut_slices();
        unsafe {
            ptr::drop_in_place(start);
            ptr::drop_in_place(end);
        }
    }
}

impl<T: Clone> Clone for GapBuffer<T> {
    fn clone(&self) -> Self {
        let mut result = Self::with_capacity(self.len());
        result.append(self.iter().cloned());
        result
    }
}

impl<T: Debug> Debug for GapBuffer<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Display for GapBuffer<char> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        for c in self.iter() {
            f.write_char(*c)?;
        }
        Ok(())
    }
}

impl<T> Index<usize> for GapBuffer<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Some(item) => item,
            None => panic!("Index {} out of bounds for gap buffer of length {}", index, self.len()),
        }
    }
}

impl<T> IndexMut<usize> for GapBuffer<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        let len = self.len();
        match self.get_mut(index) {
            Some(item) => item,
            None => panic!("Index {} out of bounds for gap buffer of length {}", index, len),
        }
    }
}

impl<T: PartialEq> PartialEq for GapBuffer<T> {
    // Only the content matters. Two buffers with their gaps in different places are equal.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}
impl<T: Eq> Eq for GapBuffer<T> {}

impl<T: PartialEq> PartialEq<[T]> for GapBuffer<T> {
    fn eq(&self, other: &[T]) -> bool {
        let (start, end) = self.as_slices();
        self.len() == other.len()
            && start == &other[..start.len()]
            && end == &other[start.len()..]
    }
}

impl<T> Extend<T> for GapBuffer<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        // Most iterators (Chars, Filter, ...) don't know their exact length up front.
        let items: Vec<T> = iter.into_iter().collect();
        self.append(items);
    }
}

impl<T> FromIterator<T> for GapBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut result = Self::new();
        result.extend(iter);
        result
    }
}

impl<T> From<Vec<T>> for GapBuffer<T> {
    fn from(items: Vec<T>) -> Self {
        let mut result = Self::with_capacity(items.len());
        result.append(items);
        result
    }
}

impl<T: Clone> From<&[T]> for GapBuffer<T> {
    fn from(items: &[T]) -> Self {
        let mut result = Self::with_capacity(items.len());
        result.append(items.iter().cloned());
        result
    }
}

impl<'a> From<&'a str> for GapBuffer<char> {
    fn from(s: &'a str) -> Self {
        s.chars().collect()
    }
}

impl<'a, T> IntoIterator for &'a GapBuffer<T> {
    type Item = &'a T;
    type IntoIter = Elements<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
