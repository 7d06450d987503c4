//! The indexed-sequence contract.
//!
//! [`Sequence`] is the one trait every mutable ordered sequence in this crate
//! implements. It carries required accessors, a handful of mutators whose
//! default implementation rejects the call with
//! [`SeqError::UnsupportedMutation`], and provided search and view operations
//! built on top of them.
//!
//! The free functions in this module ([`remove_if`], [`replace_all`],
//! [`sort_by`], [`to_vec`], [`copy_into`]) are written purely against
//! [`Sequence`] and [`SeqCursor`], so they work unchanged on arrays, linked
//! sequences, slices and bound views.

use core::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::hash::{BuildHasher, Hash};

use crate::error::check_range;
use crate::{CursorPosition, IndexCursor, Result, SeqCursor, SeqError, Version, View};

/// Mutable ordered sequence addressed by zero-based index.
pub trait Sequence<T> {
    /// Cursor type returned by [`cursor_at`](Self::cursor_at).
    type Cursor: SeqCursor<T, Self>;

    /// Number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if the sequence holds no elements.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current structural-mutation version.
    fn version(&self) -> Version;

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index < len`.
    fn get(&self, index: usize) -> Result<&T>;

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// Not a structural change: the version is left alone.
    fn set(&mut self, index: usize, value: T) -> Result<T> {
        let _ = (index, value);
        Err(SeqError::UnsupportedMutation { op: "set" })
    }

    /// Inserts `value` so that it ends up at `index`, shifting later elements
    /// right.
    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        let _ = (index, value);
        Err(SeqError::UnsupportedMutation { op: "insert" })
    }

    /// Removes and returns the element at `index`, shifting later elements
    /// left.
    fn remove_at(&mut self, index: usize) -> Result<T> {
        let _ = index;
        Err(SeqError::UnsupportedMutation { op: "remove_at" })
    }

    /// Appends `value` at the end.
    fn push(&mut self, value: T) -> Result<()> {
        let len = self.len();
        self.insert(len, value)
    }

    /// Removes the elements in `from..to`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] if `to > len`, [`SeqError::IllegalRange`]
    /// if `from > to`.
    fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        check_range(from, to, self.len())?;
        for _ in from..to {
            self.remove_at(from)?;
        }
        Ok(())
    }

    /// Removes every element.
    fn clear(&mut self) -> Result<()> {
        let len = self.len();
        self.remove_range(0, len)
    }

    /// Index of the first element equal to `value`.
    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        let mut cursor = self.cursor_at(0).ok()?;
        while cursor.has_next(self) {
            let index = cursor.next_index();
            if cursor.next(self).ok()? == value {
                return Some(index);
            }
        }
        None
    }

    /// Index of the last element equal to `value`.
    fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        let mut cursor = self.cursor_at(self.len()).ok()?;
        while cursor.has_previous() {
            if cursor.previous(self).ok()? == value {
                return Some(cursor.next_index());
            }
        }
        None
    }

    /// Returns `true` if some element equals `value`.
    fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    /// Returns a cursor positioned before `index`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index <= len`.
    fn cursor_at(&self, index: usize) -> Result<Self::Cursor>;

    /// Returns a view aliasing `from..to`, stamped with the current version.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] if `to > len`, [`SeqError::IllegalRange`]
    /// if `from > to`.
    fn sub_view(&self, from: usize, to: usize) -> Result<View> {
        check_range(from, to, self.len())?;
        Ok(View::new(from, to - from, self.version()))
    }
}

/// Slices are fixed-length: `set` works, structural mutators do not.
impl<T> Sequence<T> for [T] {
    type Cursor = IndexCursor;

    #[inline]
    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    #[inline]
    fn version(&self) -> Version {
        Version::UNOWNED
    }

    fn get(&self, index: usize) -> Result<&T> {
        let len = <[T]>::len(self);
        <[T]>::get(self, index).ok_or(SeqError::IndexOutOfRange { index, len })
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        let len = <[T]>::len(self);
        let slot = <[T]>::get_mut(self, index).ok_or(SeqError::IndexOutOfRange { index, len })?;
        Ok(core::mem::replace(slot, value))
    }

    fn cursor_at(&self, index: usize) -> Result<IndexCursor> {
        IndexCursor::new(self, index)
    }
}

// ============================================================================
// Membership
// ============================================================================

/// A collection that can answer "is this value in you?".
///
/// Drives [`ArraySequence::remove_all`](crate::ArraySequence::remove_all) and
/// friends.
pub trait Membership<T> {
    /// Returns `true` if `value` is a member.
    fn contains_value(&self, value: &T) -> bool;
}

impl<T: Eq + Hash, S: BuildHasher> Membership<T> for HashSet<T, S> {
    #[inline]
    fn contains_value(&self, value: &T) -> bool {
        self.contains(value)
    }
}

impl<T: Ord> Membership<T> for BTreeSet<T> {
    #[inline]
    fn contains_value(&self, value: &T) -> bool {
        self.contains(value)
    }
}

impl<T: PartialEq> Membership<T> for [T] {
    #[inline]
    fn contains_value(&self, value: &T) -> bool {
        <[T]>::contains(self, value)
    }
}

impl<T: PartialEq, const N: usize> Membership<T> for [T; N] {
    #[inline]
    fn contains_value(&self, value: &T) -> bool {
        <[T]>::contains(self, value)
    }
}

impl<T: PartialEq> Membership<T> for Vec<T> {
    #[inline]
    fn contains_value(&self, value: &T) -> bool {
        <[T]>::contains(self, value)
    }
}

// ============================================================================
// Cursor-driven algorithms
// ============================================================================

/// Removes every element matching `pred` through a cursor.
///
/// Returns `true` if anything was removed.
pub fn remove_if<T, S, F>(seq: &mut S, mut pred: F) -> Result<bool>
where
    S: Sequence<T> + ?Sized,
    F: FnMut(&T) -> bool,
{
    let mut cursor = seq.cursor_at(0)?;
    let mut changed = false;
    while cursor.has_next(seq) {
        if pred(cursor.next(seq)?) {
            cursor.remove(seq)?;
            changed = true;
        }
    }
    Ok(changed)
}

/// Replaces every element with `f(element)`, in order.
pub fn replace_all<T, S, F>(seq: &mut S, mut f: F) -> Result<()>
where
    S: Sequence<T> + ?Sized,
    F: FnMut(&T) -> T,
{
    let mut cursor = seq.cursor_at(0)?;
    while cursor.has_next(seq) {
        let replacement = f(cursor.next(seq)?);
        cursor.set(seq, replacement)?;
    }
    Ok(())
}

/// Stable-sorts the sequence with `compare`.
///
/// Elements are copied out, sorted, and written back with `set`, so the
/// version does not change.
pub fn sort_by<T, S, F>(seq: &mut S, mut compare: F) -> Result<()>
where
    T: Clone,
    S: Sequence<T> + ?Sized,
    F: FnMut(&T, &T) -> Ordering,
{
    let mut sorted = to_vec(seq)?;
    sorted.sort_by(&mut compare);

    let mut cursor = seq.cursor_at(0)?;
    for value in sorted {
        cursor.next(seq)?;
        cursor.set(seq, value)?;
    }
    Ok(())
}

/// Copies the elements, in order, into a fresh `Vec`.
pub fn to_vec<T, S>(seq: &S) -> Result<Vec<T>>
where
    T: Clone,
    S: Sequence<T> + ?Sized,
{
    let mut out = Vec::with_capacity(seq.len());
    let mut cursor = seq.cursor_at(0)?;
    while cursor.has_next(seq) {
        out.push(cursor.next(seq)?.clone());
    }
    Ok(out)
}

/// Copies the elements into a caller-supplied buffer.
///
/// A buffer shorter than the sequence is grown to fit. A longer one keeps its
/// tail, except that the slot right after the last element is set to `None`
/// to mark the end.
pub fn copy_into<T, S>(seq: &S, out: &mut Vec<Option<T>>) -> Result<()>
where
    T: Clone,
    S: Sequence<T> + ?Sized,
{
    let len = seq.len();
    if out.len() < len {
        out.resize_with(len, || None);
    }

    let mut cursor = seq.cursor_at(0)?;
    let mut slot = 0;
    while cursor.has_next(seq) {
        out[slot] = Some(cursor.next(seq)?.clone());
        slot += 1;
    }
    if out.len() > len {
        out[len] = None;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArraySequence, LinkedSequence};

    /// Minimal sequence exercising the default mutators.
    struct Fixed(Vec<u32>);

    impl Sequence<u32> for Fixed {
        type Cursor = IndexCursor;

        fn len(&self) -> usize {
            self.0.len()
        }

        fn version(&self) -> Version {
            Version::UNOWNED
        }

        fn get(&self, index: usize) -> Result<&u32> {
            Sequence::get(self.0.as_slice(), index)
        }

        fn cursor_at(&self, index: usize) -> Result<IndexCursor> {
            IndexCursor::new(self, index)
        }
    }

    // ========================================================================
    // Defaults
    // ========================================================================

    #[test]
    fn default_mutators_are_unsupported() {
        let mut seq = Fixed(vec![1, 2]);
        assert_eq!(
            seq.set(0, 9),
            Err(SeqError::UnsupportedMutation { op: "set" })
        );
        assert_eq!(
            seq.push(3),
            Err(SeqError::UnsupportedMutation { op: "insert" })
        );
        assert_eq!(
            seq.remove_at(0),
            Err(SeqError::UnsupportedMutation { op: "remove_at" })
        );
        assert_eq!(
            seq.clear(),
            Err(SeqError::UnsupportedMutation { op: "remove_at" })
        );
        // an empty range never reaches remove_at
        assert_eq!(seq.remove_range(1, 1), Ok(()));
    }

    #[test]
    fn provided_search() {
        let seq = Fixed(vec![4, 7, 4, 9]);
        assert_eq!(seq.index_of(&4), Some(0));
        assert_eq!(seq.last_index_of(&4), Some(2));
        assert_eq!(seq.index_of(&5), None);
        assert_eq!(seq.last_index_of(&5), None);
        assert!(seq.contains(&9));
        assert!(!seq.is_empty());
    }

    #[test]
    fn sub_view_bounds() {
        let seq = Fixed(vec![1, 2, 3]);
        assert!(seq.sub_view(0, 3).is_ok());
        assert_eq!(
            seq.sub_view(0, 4).unwrap_err(),
            SeqError::IndexOutOfRange { index: 4, len: 3 }
        );
        assert_eq!(
            seq.sub_view(2, 1).unwrap_err(),
            SeqError::IllegalRange { from: 2, to: 1 }
        );
    }

    // ========================================================================
    // Slices
    // ========================================================================

    #[test]
    fn slice_set_and_sort() {
        let mut values = [5u32, 3, 4, 1];
        let slice: &mut [u32] = &mut values;
        assert_eq!(Sequence::set(&mut *slice, 0, 6), Ok(5));
        assert_eq!(
            Sequence::insert(&mut *slice, 0, 1),
            Err(SeqError::UnsupportedMutation { op: "insert" })
        );
        sort_by(slice, |a: &u32, b: &u32| a.cmp(b)).unwrap();
        assert_eq!(values, [1, 3, 4, 6]);
    }

    // ========================================================================
    // Free functions
    // ========================================================================

    #[test]
    fn remove_if_on_both_variants() {
        let mut array: ArraySequence<u32> = (0..10).collect();
        let mut linked: LinkedSequence<u32> = (0..10).collect();

        assert_eq!(remove_if(&mut array, |v: &u32| v.is_multiple_of(3)), Ok(true));
        assert_eq!(remove_if(&mut linked, |v: &u32| v.is_multiple_of(3)), Ok(true));
        assert_eq!(remove_if(&mut array, |v: &u32| *v > 100), Ok(false));

        let expected = vec![1, 2, 4, 5, 7, 8];
        assert_eq!(to_vec(&array), Ok(expected.clone()));
        assert_eq!(to_vec(&linked), Ok(expected));
    }

    #[test]
    fn replace_all_keeps_version() {
        let mut linked: LinkedSequence<u32> = (1..=4).collect();
        let before = linked.version();
        replace_all(&mut linked, |v: &u32| v * 10).unwrap();
        assert_eq!(linked.version(), before);
        assert_eq!(to_vec(&linked), Ok(vec![10, 20, 30, 40]));
    }

    #[test]
    fn sort_by_is_stable() {
        let mut seq: LinkedSequence<(u32, char)> =
            [(2, 'a'), (1, 'b'), (2, 'c'), (1, 'd')].into_iter().collect();
        sort_by(&mut seq, |a: &(u32, char), b: &(u32, char)| a.0.cmp(&b.0)).unwrap();
        assert_eq!(
            to_vec(&seq),
            Ok(vec![(1, 'b'), (1, 'd'), (2, 'a'), (2, 'c')])
        );
    }

    #[test]
    fn copy_into_short_buffer_grows() {
        let seq: ArraySequence<u32> = (1..=3).collect();
        let mut out = vec![None];
        copy_into(&seq, &mut out).unwrap();
        assert_eq!(out, vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn copy_into_long_buffer_marks_end() {
        let seq: ArraySequence<u32> = (1..=2).collect();
        let mut out = vec![Some(9); 5];
        copy_into(&seq, &mut out).unwrap();
        assert_eq!(out, vec![Some(1), Some(2), None, Some(9), Some(9)]);
    }

    #[test]
    fn membership_impls() {
        let hashed: HashSet<u32> = [1, 2].into_iter().collect();
        let ordered: BTreeSet<u32> = [1, 2].into_iter().collect();
        assert!(hashed.contains_value(&1));
        assert!(!ordered.contains_value(&3));
        assert!([1u32, 2].contains_value(&2));
        assert!(vec![1u32].contains_value(&1));
    }
}
