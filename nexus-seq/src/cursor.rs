//! Fail-fast cursor protocol.
//!
//! A cursor is a detached state machine: `{position, last returned,
//! expected version}`. It does not borrow the sequence between calls. Each
//! call is handed the sequence, so the sequence can still be mutated
//! directly while a cursor is outstanding. The next cursor call then sees a
//! version it did not expect and fails with
//! [`SeqError::ConcurrentModification`].
//!
//! Mutating *through* the cursor (`remove`, `set`, `add`) re-synchronizes the
//! expected version and adjusts the position, so it never faults.
//!
//! ```
//! use nexus_seq::{ArraySequence, CursorPosition, SeqCursor, SeqError, Sequence};
//!
//! let mut seq: ArraySequence<u32> = (1..=4).collect();
//! let mut cursor = seq.cursor_at(0).unwrap();
//!
//! // Remove evens through the cursor.
//! while cursor.has_next(&seq) {
//!     if cursor.next(&seq).unwrap().is_multiple_of(2) {
//!         cursor.remove(&mut seq).unwrap();
//!     }
//! }
//! assert_eq!(seq.to_vec(), vec![1, 3]);
//! assert_eq!(cursor.next_index(), 2);
//!
//! // A direct mutation invalidates outstanding cursors.
//! let mut cursor = seq.cursor_at(0).unwrap();
//! seq.push(5);
//! assert!(matches!(
//!     cursor.next(&seq),
//!     Err(SeqError::ConcurrentModification { .. })
//! ));
//! ```

use crate::error::check_position_index;
use crate::{Result, SeqError, Sequence, Version};

/// Where a cursor sits, independent of what it walks.
///
/// The position sits *between* elements: `next_index()` is the index of the
/// element the next call to `next` returns.
pub trait CursorPosition {
    /// Returns `true` if `previous` would return an element.
    fn has_previous(&self) -> bool;

    /// Index of the element a subsequent `next` would return.
    fn next_index(&self) -> usize;

    /// Index of the element a subsequent `previous` would return.
    #[inline]
    fn previous_index(&self) -> Option<usize> {
        self.next_index().checked_sub(1)
    }
}

/// Bidirectional list cursor over a sequence `S` of `T`.
pub trait SeqCursor<T, S: ?Sized>: CursorPosition {
    /// Returns `true` if `next` would return an element.
    fn has_next(&self, seq: &S) -> bool;

    /// Returns the next element and advances.
    ///
    /// # Errors
    ///
    /// [`SeqError::ConcurrentModification`] if `seq` changed behind the
    /// cursor (checked first), [`SeqError::NoSuchElement`] at the end.
    fn next<'s>(&mut self, seq: &'s S) -> Result<&'s T>;

    /// Returns the previous element and moves back.
    ///
    /// # Errors
    ///
    /// Same as [`next`](Self::next), at the start instead of the end.
    fn previous<'s>(&mut self, seq: &'s S) -> Result<&'s T>;

    /// Removes the element last returned by `next` or `previous`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IllegalCursorState`] if there is no such element (none
    /// returned yet, or already removed / followed by `add`).
    fn remove(&mut self, seq: &mut S) -> Result<T>;

    /// Replaces the element last returned by `next` or `previous`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IllegalCursorState`] as for [`remove`](Self::remove).
    fn set(&mut self, seq: &mut S, value: T) -> Result<T>;

    /// Inserts `value` at the cursor position, before the element `next`
    /// would return. A following `next` is unaffected; `previous` returns
    /// the new element.
    fn add(&mut self, seq: &mut S, value: T) -> Result<()>;
}

/// Index-based cursor shared by every random-access [`Sequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCursor {
    cursor: usize,
    last: Option<usize>,
    expected: Version,
}

impl IndexCursor {
    /// Creates a cursor positioned before `index`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index <= seq.len()`.
    pub fn new<T, S: Sequence<T> + ?Sized>(seq: &S, index: usize) -> Result<Self> {
        check_position_index(index, seq.len())?;
        Ok(Self {
            cursor: index,
            last: None,
            expected: seq.version(),
        })
    }
}

impl CursorPosition for IndexCursor {
    #[inline]
    fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    #[inline]
    fn next_index(&self) -> usize {
        self.cursor
    }
}

impl<T, S: Sequence<T> + ?Sized> SeqCursor<T, S> for IndexCursor {
    #[inline]
    fn has_next(&self, seq: &S) -> bool {
        self.cursor < seq.len()
    }

    fn next<'s>(&mut self, seq: &'s S) -> Result<&'s T> {
        self.expected.check(seq.version())?;
        let i = self.cursor;
        let value = seq.get(i).map_err(|_| SeqError::NoSuchElement)?;
        self.last = Some(i);
        self.cursor = i + 1;
        Ok(value)
    }

    fn previous<'s>(&mut self, seq: &'s S) -> Result<&'s T> {
        self.expected.check(seq.version())?;
        let i = self.cursor.checked_sub(1).ok_or(SeqError::NoSuchElement)?;
        let value = seq.get(i).map_err(|_| SeqError::NoSuchElement)?;
        self.last = Some(i);
        self.cursor = i;
        Ok(value)
    }

    fn remove(&mut self, seq: &mut S) -> Result<T> {
        let last = self.last.ok_or(SeqError::IllegalCursorState)?;
        self.expected.check(seq.version())?;

        let value = seq.remove_at(last)?;
        if last < self.cursor {
            self.cursor -= 1;
        }
        self.last = None;
        self.expected = seq.version();
        Ok(value)
    }

    fn set(&mut self, seq: &mut S, value: T) -> Result<T> {
        let last = self.last.ok_or(SeqError::IllegalCursorState)?;
        self.expected.check(seq.version())?;

        let old = seq.set(last, value)?;
        self.expected = seq.version();
        Ok(old)
    }

    fn add(&mut self, seq: &mut S, value: T) -> Result<()> {
        self.expected.check(seq.version())?;

        seq.insert(self.cursor, value)?;
        self.cursor += 1;
        self.last = None;
        self.expected = seq.version();
        Ok(())
    }
}
