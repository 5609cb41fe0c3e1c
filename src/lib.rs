//! A gap buffer over arbitrary elements, intended as the backing store for text in an editor.
//!
//! [`GapBuffer`] keeps its content in one contiguous allocation with a single hole (the gap) in
//! it. Edits move the gap to the edit point first, so bursts of edits in the same area are cheap
//! no matter how big the buffer is.
//!
//! Positions can be given as plain logical indexes or through [`GapBufferIterator`]s, which are
//! random access iterators that transparently step over the gap. Spans of elements are described
//! with [`Range`].
//!
//! ```
//! use gapbuffer::{GapBuffer, make_range};
//!
//! let mut buffer = GapBuffer::new();
//! buffer.append("world".bytes());
//! buffer.insert("hello".bytes(), 0).unwrap();
//!
//! let space_at = buffer.begin().offset(5).cursor();
//! buffer.insert_at(" ".bytes(), space_at).unwrap();
//! assert_eq!(buffer.to_vec(), b"hello world");
//!
//! let word = make_range(buffer.begin(), buffer.begin().offset(5));
//! assert_eq!(word.into_iter().copied().collect::<Vec<u8>>(), b"hello");
//! ```

mod gapbuffer;
mod iter;
mod range;

pub use crate::gapbuffer::GapBuffer;
pub use crate::iter::{Cursor, Elements, GapBufferIterator};
pub use crate::range::{make_range, Distance, Range};

/// Errors returned by the editing methods on [`GapBuffer`]. When one of these is returned, the
/// buffer has not been modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GapBufferError {
    #[error("position {position} is out of bounds for gap buffer of length {len}")]
    PositionOutOfBounds { position: usize, len: usize },

    /// The cursor was made before the buffer was last edited, or belongs to a different buffer.
    #[error("cursor does not belong to the current state of this gap buffer")]
    StaleCursor,

    #[error("range end {end} is before range start {start}")]
    ReversedRange { start: usize, end: usize },
}

pub type Result<T, E = GapBufferError> = std::result::Result<T, E>;
