//! Aliasing sub-views.
//!
//! A [`View`] is a window `offset..offset + len` onto a backing sequence. It
//! does not own or borrow the elements; every call is handed the backing, and
//! every call first checks that the backing has not changed structurally
//! behind the view's back. Changes made *through* the view are written to the
//! backing directly and the view adjusts its own length and version stamp.
//!
//! ```
//! use nexus_seq::{ArraySequence, SeqError, Sequence};
//!
//! let mut seq: ArraySequence<char> = "abcde".chars().collect();
//! let mut view = seq.sub_view(1, 4).unwrap();
//!
//! view.set(&mut seq, 0, 'x').unwrap();
//! assert_eq!(seq.get(1), Ok(&'x'));
//!
//! view.remove_at(&mut seq, 2).unwrap();
//! assert_eq!(view.to_vec(&seq).unwrap(), vec!['x', 'c']);
//! assert_eq!(seq.to_vec(), vec!['a', 'x', 'c', 'e']);
//!
//! // Direct mutation of the backing invalidates the view.
//! seq.push('f');
//! assert!(matches!(view.len(&seq), Err(SeqError::ConcurrentModification { .. })));
//! ```
//!
//! # Nesting
//!
//! [`View::bind`] pairs a view with its backing as a [`ViewMut`], which is a
//! [`Sequence`] itself. Sub-views taken from a `ViewMut` route every change
//! through the parent view, so offsets compose and all levels stay in sync.

use core::marker::PhantomData;

use crate::error::{check_element_index, check_position_index, check_range};
use crate::{IndexCursor, Result, SeqCursor, Sequence, Version};

/// Window onto a contiguous range of a backing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View {
    offset: usize,
    len: usize,
    expected: Version,
}

impl View {
    pub(crate) fn new(offset: usize, len: usize, expected: Version) -> Self {
        Self {
            offset,
            len,
            expected,
        }
    }

    /// Start of the window in the backing.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn check(&self, live: Version) -> Result<()> {
        self.expected.check(live)
    }

    /// Number of elements in the window.
    ///
    /// # Errors
    ///
    /// [`SeqError::ConcurrentModification`](crate::SeqError::ConcurrentModification)
    /// if the backing changed structurally behind the view. Every other
    /// method checks the same thing first.
    pub fn len<T, S: Sequence<T> + ?Sized>(&self, backing: &S) -> Result<usize> {
        self.check(backing.version())?;
        Ok(self.len)
    }

    /// Returns `true` if the window is empty.
    pub fn is_empty<T, S: Sequence<T> + ?Sized>(&self, backing: &S) -> Result<bool> {
        Ok(self.len(backing)? == 0)
    }

    /// Returns the element at view index `index`.
    pub fn get<'s, T, S: Sequence<T> + ?Sized>(&self, backing: &'s S, index: usize) -> Result<&'s T> {
        self.check(backing.version())?;
        check_element_index(index, self.len)?;
        backing.get(self.offset + index)
    }

    /// Replaces the element at view index `index`.
    pub fn set<T, S: Sequence<T> + ?Sized>(
        &mut self,
        backing: &mut S,
        index: usize,
        value: T,
    ) -> Result<T> {
        self.check(backing.version())?;
        check_element_index(index, self.len)?;
        let old = backing.set(self.offset + index, value)?;
        self.expected = backing.version();
        Ok(old)
    }

    /// Inserts `value` at view index `index`, growing the window by one.
    pub fn insert<T, S: Sequence<T> + ?Sized>(
        &mut self,
        backing: &mut S,
        index: usize,
        value: T,
    ) -> Result<()> {
        self.check(backing.version())?;
        check_position_index(index, self.len)?;
        backing.insert(self.offset + index, value)?;
        self.expected = backing.version();
        self.len += 1;
        Ok(())
    }

    /// Appends `value` at the end of the window.
    pub fn push<T, S: Sequence<T> + ?Sized>(&mut self, backing: &mut S, value: T) -> Result<()> {
        self.insert(backing, self.len, value)
    }

    /// Removes the element at view index `index`, shrinking the window by
    /// one.
    pub fn remove_at<T, S: Sequence<T> + ?Sized>(
        &mut self,
        backing: &mut S,
        index: usize,
    ) -> Result<T> {
        self.check(backing.version())?;
        check_element_index(index, self.len)?;
        let value = backing.remove_at(self.offset + index)?;
        self.expected = backing.version();
        self.len -= 1;
        Ok(value)
    }

    /// Removes view indices `from..to`.
    pub fn remove_range<T, S: Sequence<T> + ?Sized>(
        &mut self,
        backing: &mut S,
        from: usize,
        to: usize,
    ) -> Result<()> {
        self.check(backing.version())?;
        check_range(from, to, self.len)?;
        backing.remove_range(self.offset + from, self.offset + to)?;
        self.expected = backing.version();
        self.len -= to - from;
        Ok(())
    }

    /// Removes every element in the window from the backing.
    pub fn clear<T, S: Sequence<T> + ?Sized>(&mut self, backing: &mut S) -> Result<()> {
        self.remove_range(backing, 0, self.len)
    }

    /// Iterates over the window.
    pub fn iter<'s, T, S: Sequence<T> + ?Sized>(&self, backing: &'s S) -> Result<ViewIter<'s, T, S>> {
        self.check(backing.version())?;
        Ok(ViewIter {
            backing,
            cursor: backing.cursor_at(self.offset)?,
            remaining: self.len,
            _marker: PhantomData,
        })
    }

    /// Copies the window into a fresh `Vec`.
    pub fn to_vec<T: Clone, S: Sequence<T> + ?Sized>(&self, backing: &S) -> Result<Vec<T>> {
        Ok(self.iter::<T, S>(backing)?.cloned().collect())
    }

    /// A view of `from..to` within this window, over the same backing.
    ///
    /// The result is a sibling: mutating through it invalidates `self`. Use
    /// [`bind`](Self::bind) and take the sub-view from the [`ViewMut`] to
    /// keep both in sync.
    pub fn sub_view<T, S: Sequence<T> + ?Sized>(
        &self,
        backing: &S,
        from: usize,
        to: usize,
    ) -> Result<View> {
        self.check(backing.version())?;
        check_range(from, to, self.len)?;
        Ok(View::new(self.offset + from, to - from, self.expected))
    }

    /// Pairs the view with its backing as a [`Sequence`].
    pub fn bind<'a, T, S: Sequence<T> + ?Sized>(
        &'a mut self,
        backing: &'a mut S,
    ) -> Result<ViewMut<'a, T, S>> {
        self.check(backing.version())?;
        Ok(ViewMut {
            view: self,
            backing,
            _marker: PhantomData,
        })
    }
}

// ============================================================================
// ViewIter
// ============================================================================

/// Iterator over a [`View`], driven by the backing's own cursor.
pub struct ViewIter<'s, T, S: Sequence<T> + ?Sized> {
    backing: &'s S,
    cursor: S::Cursor,
    remaining: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<'s, T: 's, S: Sequence<T> + ?Sized> Iterator for ViewIter<'s, T, S> {
    type Item = &'s T;

    fn next(&mut self) -> Option<&'s T> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.cursor.next(self.backing).ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'s, T: 's, S: Sequence<T> + ?Sized> ExactSizeIterator for ViewIter<'s, T, S> {}

// ============================================================================
// ViewMut
// ============================================================================

/// A [`View`] bound to its backing. Implements [`Sequence`], so it can be
/// cursored, searched and sub-viewed like any other sequence.
pub struct ViewMut<'a, T, S: ?Sized> {
    view: &'a mut View,
    backing: &'a mut S,
    _marker: PhantomData<fn() -> T>,
}

impl<T, S: Sequence<T> + ?Sized> Sequence<T> for ViewMut<'_, T, S> {
    type Cursor = IndexCursor;

    #[inline]
    fn len(&self) -> usize {
        self.view.len
    }

    #[inline]
    fn version(&self) -> Version {
        self.backing.version()
    }

    fn get(&self, index: usize) -> Result<&T> {
        self.view.get(&*self.backing, index)
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        self.view.set(&mut *self.backing, index, value)
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.view.insert(&mut *self.backing, index, value)
    }

    fn remove_at(&mut self, index: usize) -> Result<T> {
        self.view.remove_at(&mut *self.backing, index)
    }

    fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        self.view.remove_range(&mut *self.backing, from, to)
    }

    fn cursor_at(&self, index: usize) -> Result<IndexCursor> {
        IndexCursor::new(self, index)
    }
}
