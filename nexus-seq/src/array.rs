//! Growable contiguous sequence.
//!
//! Elements live in an owned slot buffer. Slots below `len` are occupied,
//! slots at or above `len` are `None`, so shrinking never leaves a stale
//! owner behind.
//!
//! # Growth
//!
//! When an insertion needs more room the buffer grows to
//! `max(required, old + old / 2)`. A sequence made with [`ArraySequence::new`]
//! allocates nothing until first use and then jumps straight to a capacity of
//! 10.
//!
//! ```
//! use nexus_seq::ArraySequence;
//!
//! let mut seq = ArraySequence::new();
//! assert_eq!(seq.capacity(), 0);
//!
//! seq.push(1u32);
//! assert_eq!(seq.capacity(), 10);
//!
//! for v in 2..=11 {
//!     seq.push(v);
//! }
//! assert_eq!(seq.capacity(), 15);
//! assert_eq!(seq.len(), 11);
//! ```

use core::cmp::Ordering;
use core::fmt;
use core::mem;
use core::ops::{Index, IndexMut};
use core::slice;
use std::vec;

use crate::error::{check_position_index, check_range};
use crate::split::ArraySplit;
use crate::{IndexCursor, Membership, Result, SeqError, Sequence, Version};

/// Capacity a lazily created sequence jumps to on first growth.
pub const DEFAULT_CAPACITY: usize = 10;

/// Slots kept in reserve below the addressable maximum.
const CAPACITY_HEADROOM: usize = 8;

/// Largest capacity an [`ArraySequence<T>`] will allocate.
#[inline]
pub const fn max_capacity<T>() -> usize {
    let slot = mem::size_of::<Option<T>>();
    let slot = if slot == 0 { 1 } else { slot };
    isize::MAX as usize / slot - CAPACITY_HEADROOM
}

/// Growable contiguous sequence with amortized O(1) append.
pub struct ArraySequence<T> {
    slots: Box<[Option<T>]>,
    len: usize,
    version: Version,
    /// Built by `new()` and never sized explicitly.
    lazy_default: bool,
}

impl<T> ArraySequence<T> {
    /// Creates an empty sequence without allocating.
    pub fn new() -> Self {
        Self {
            slots: Box::default(),
            len: 0,
            version: Version::fresh(),
            lazy_default: true,
        }
    }

    /// Creates an empty sequence with room for `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` cannot be allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(seq) => seq,
            Err(err) => panic!("{err}"),
        }
    }

    /// Creates an empty sequence with room for `capacity` elements.
    ///
    /// # Errors
    ///
    /// [`SeqError::AllocationTooLarge`] if `capacity` exceeds
    /// [`max_capacity`] or the allocator refuses.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            slots: alloc_slots(capacity)?,
            len: 0,
            version: Version::fresh(),
            lazy_default: false,
        })
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the sequence holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots currently allocated.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current structural-mutation version.
    #[inline]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Starts the sequence over as a new owner at count 0.
    pub(crate) fn reset_version(&mut self) {
        self.version = Version::fresh();
    }

    // ------------------------------------------------------------------------
    // Capacity
    // ------------------------------------------------------------------------

    /// Makes sure at least `min_capacity` slots are allocated.
    ///
    /// For a lazily created, still empty-buffered sequence any request up to
    /// the default capacity is a no-op: the first insertion will allocate it
    /// anyway. Does not change the version.
    pub fn ensure_capacity(&mut self, min_capacity: usize) -> Result<()> {
        let min_expand = if self.is_lazy() { DEFAULT_CAPACITY } else { 0 };
        if min_capacity > min_expand {
            self.reserve_for(min_capacity)?;
        }
        Ok(())
    }

    /// Shrinks the buffer to exactly `len` slots. Does not change the
    /// version.
    pub fn trim_to_size(&mut self) {
        if self.len < self.slots.len() {
            let live: Vec<Option<T>> = self.slots[..self.len]
                .iter_mut()
                .map(Option::take)
                .collect();
            self.slots = live.into_boxed_slice();
            self.lazy_default = false;
            tracing::trace!(capacity = self.len, "array sequence trimmed");
        }
    }

    #[inline]
    fn is_lazy(&self) -> bool {
        self.lazy_default && self.slots.is_empty()
    }

    fn reserve_for(&mut self, required: usize) -> Result<()> {
        let required = if self.is_lazy() {
            required.max(DEFAULT_CAPACITY)
        } else {
            required
        };
        if required > self.slots.len() {
            self.grow(required)?;
        }
        Ok(())
    }

    fn grow(&mut self, required: usize) -> Result<()> {
        let max = max_capacity::<T>();
        if required > max {
            return Err(SeqError::AllocationTooLarge {
                requested: required,
                max,
            });
        }

        let old = self.slots.len();
        let new = (old + (old >> 1)).max(required).min(max);
        let mut slots = alloc_slots(new)?;
        for (dst, src) in slots.iter_mut().zip(self.slots[..self.len].iter_mut()) {
            *dst = src.take();
        }
        self.slots = slots;
        self.lazy_default = false;

        tracing::trace!(old, new, "array sequence grew");
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Element access
    // ------------------------------------------------------------------------

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index < len`.
    #[inline]
    pub fn get(&self, index: usize) -> Result<&T> {
        self.slots[..self.len]
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(SeqError::IndexOutOfRange {
                index,
                len: self.len,
            })
    }

    /// Returns the element at `index` mutably.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index < len`.
    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        self.slots[..len]
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(SeqError::IndexOutOfRange { index, len })
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// Not a structural change.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(mem::replace(slot, value))
    }

    /// Returns the first element, if any.
    #[inline]
    pub fn first(&self) -> Option<&T> {
        self.get(0).ok()
    }

    /// Returns the last element, if any.
    #[inline]
    pub fn last(&self) -> Option<&T> {
        self.len.checked_sub(1).and_then(|i| self.get(i).ok())
    }

    // ------------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------------

    /// Appends `value`.
    ///
    /// # Panics
    ///
    /// Panics if the buffer cannot grow. Use [`try_push`](Self::try_push) to
    /// handle that case.
    pub fn push(&mut self, value: T) {
        if let Err(err) = self.try_push(value) {
            panic!("{err}");
        }
    }

    /// Appends `value`.
    ///
    /// # Errors
    ///
    /// [`SeqError::AllocationTooLarge`] if the buffer cannot grow.
    pub fn try_push(&mut self, value: T) -> Result<()> {
        self.reserve_for(self.len + 1)?;
        self.slots[self.len] = Some(value);
        self.len += 1;
        self.version.bump();
        Ok(())
    }

    /// Inserts `value` at `index`, shifting `index..len` one slot right.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index <= len`,
    /// [`SeqError::AllocationTooLarge`] if the buffer cannot grow.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        check_position_index(index, self.len)?;
        self.reserve_for(self.len + 1)?;

        // The empty slot at `len` rotates down to `index`.
        self.slots[index..=self.len].rotate_right(1);
        self.slots[index] = Some(value);
        self.len += 1;
        self.version.bump();
        Ok(())
    }

    /// Inserts every value of `values` starting at `index`, preserving their
    /// order. Returns `true` if anything was inserted.
    ///
    /// The values are collected first, then the tail is shifted once.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index <= len`,
    /// [`SeqError::AllocationTooLarge`] if the buffer cannot grow. Nothing is
    /// inserted on error.
    pub fn insert_all<I>(&mut self, index: usize, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
    {
        check_position_index(index, self.len)?;

        let incoming: Vec<T> = values.into_iter().collect();
        let count = incoming.len();
        if count == 0 {
            return Ok(false);
        }

        let required = self
            .len
            .checked_add(count)
            .ok_or(SeqError::AllocationTooLarge {
                requested: usize::MAX,
                max: max_capacity::<T>(),
            })?;
        self.reserve_for(required)?;

        self.slots[index..required].rotate_right(count);
        for (slot, value) in self.slots[index..index + count].iter_mut().zip(incoming) {
            *slot = Some(value);
        }
        self.len = required;
        self.version.bump();
        Ok(true)
    }

    /// Appends every value of `values`. Returns `true` if anything was
    /// appended.
    pub fn push_all<I>(&mut self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
    {
        self.insert_all(self.len, values)
    }

    // ------------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------------

    /// Removes and returns the element at `index`, shifting `index + 1..len`
    /// one slot left.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index < len`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let len = self.len;
        let Some(value) = self.slots[..len].get_mut(index).and_then(Option::take) else {
            return Err(SeqError::IndexOutOfRange { index, len });
        };

        // The vacated slot rotates up to `len - 1`.
        self.slots[index..len].rotate_left(1);
        self.len -= 1;
        self.version.bump();
        Ok(value)
    }

    /// Removes the first element equal to `value`. Returns `true` if one was
    /// found.
    pub fn remove_value(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(value) {
            Some(index) => self.remove_at(index).is_ok(),
            None => false,
        }
    }

    /// Removes the elements in `from..to`, shifting the tail down once.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] if `to > len`, [`SeqError::IllegalRange`]
    /// if `from > to`.
    pub fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        check_range(from, to, self.len)?;
        if from == to {
            return Ok(());
        }

        for slot in &mut self.slots[from..to] {
            *slot = None;
        }
        self.slots[from..self.len].rotate_left(to - from);
        self.len -= to - from;
        self.version.bump();
        Ok(())
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        for slot in &mut self.slots[..self.len] {
            *slot = None;
        }
        self.len = 0;
        self.version.bump();
    }

    /// Keeps only the elements for which `keep` returns `true`, preserving
    /// their order. Returns `true` if anything was removed.
    ///
    /// One forward pass: a read position visits every live slot and a write
    /// position advances only over kept ones. The version bumps once.
    pub fn retain<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let mut write = 0;
        for read in 0..self.len {
            if self.slots[read].as_ref().is_some_and(&mut keep) {
                if read != write {
                    self.slots.swap(read, write);
                }
                write += 1;
            }
        }

        if write == self.len {
            return false;
        }
        for slot in &mut self.slots[write..self.len] {
            *slot = None;
        }
        self.len = write;
        self.version.bump();
        true
    }

    /// Removes every element matching `pred`. Returns `true` if anything was
    /// removed.
    pub fn remove_if<F>(&mut self, mut pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.retain(|v| !pred(v))
    }

    /// Removes every element contained in `set`. Returns `true` if anything
    /// was removed.
    pub fn remove_all<C>(&mut self, set: &C) -> bool
    where
        C: Membership<T> + ?Sized,
    {
        self.retain(|v| !set.contains_value(v))
    }

    /// Removes every element *not* contained in `set`. Returns `true` if
    /// anything was removed.
    pub fn retain_all<C>(&mut self, set: &C) -> bool
    where
        C: Membership<T> + ?Sized,
    {
        self.retain(|v| set.contains_value(v))
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    /// Index of the first element equal to `value`.
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|v| v == value)
    }

    /// Index of the last element equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().rposition(|v| v == value)
    }

    /// Returns `true` if some element equals `value`.
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.index_of(value).is_some()
    }

    // ------------------------------------------------------------------------
    // Ordering and copying
    // ------------------------------------------------------------------------

    /// Stable-sorts in place with `compare`.
    ///
    /// Reorders the buffer wholesale, so outstanding cursors are invalidated.
    pub fn sort_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.slots[..self.len].sort_by(|a, b| {
            a.as_ref()
                .zip(b.as_ref())
                .map_or(Ordering::Equal, |(a, b)| compare(a, b))
        });
        self.version.bump();
    }

    /// Copies the elements into a fresh `Vec`.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Copies the elements into `out`. A shorter buffer grows to fit; in a
    /// longer one the slot after the last element is set to `None`.
    pub fn copy_into(&self, out: &mut Vec<Option<T>>)
    where
        T: Clone,
    {
        if out.len() < self.len {
            out.resize_with(self.len, || None);
        }
        for (dst, src) in out.iter_mut().zip(self.iter()) {
            *dst = Some(src.clone());
        }
        if out.len() > self.len {
            out[self.len] = None;
        }
    }

    // ------------------------------------------------------------------------
    // Iteration
    // ------------------------------------------------------------------------

    /// Returns an iterator over the elements.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            slots: self.slots[..self.len].iter(),
        }
    }

    /// Returns an iterator over the elements, mutably.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            slots: self.slots[..self.len].iter_mut(),
        }
    }

    /// Returns a splittable cursor over the elements.
    #[inline]
    pub fn split_cursor(&self) -> ArraySplit<'_, T> {
        ArraySplit::new(self)
    }

    /// Live slots, all `Some`.
    #[inline]
    pub(crate) fn live_slots(&self) -> &[Option<T>] {
        &self.slots[..self.len]
    }
}

fn alloc_slots<T>(capacity: usize) -> Result<Box<[Option<T>]>> {
    let max = max_capacity::<T>();
    let too_large = SeqError::AllocationTooLarge {
        requested: capacity,
        max,
    };
    if capacity > max {
        return Err(too_large);
    }

    let mut slots = Vec::new();
    slots.try_reserve_exact(capacity).map_err(|_| too_large)?;
    slots.resize_with(capacity, || None);
    Ok(slots.into_boxed_slice())
}

// ============================================================================
// Trait impls
// ============================================================================

impl<T> Sequence<T> for ArraySequence<T> {
    type Cursor = IndexCursor;

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    #[inline]
    fn version(&self) -> Version {
        self.version
    }

    #[inline]
    fn get(&self, index: usize) -> Result<&T> {
        ArraySequence::get(self, index)
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        ArraySequence::set(self, index, value)
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        ArraySequence::insert(self, index, value)
    }

    fn remove_at(&mut self, index: usize) -> Result<T> {
        ArraySequence::remove_at(self, index)
    }

    fn push(&mut self, value: T) -> Result<()> {
        self.try_push(value)
    }

    fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        ArraySequence::remove_range(self, from, to)
    }

    fn clear(&mut self) -> Result<()> {
        ArraySequence::clear(self);
        Ok(())
    }

    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        ArraySequence::index_of(self, value)
    }

    fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        ArraySequence::last_index_of(self, value)
    }

    fn cursor_at(&self, index: usize) -> Result<IndexCursor> {
        IndexCursor::new(self, index)
    }
}

impl<T: PartialEq> Membership<T> for ArraySequence<T> {
    #[inline]
    fn contains_value(&self, value: &T) -> bool {
        self.contains(value)
    }
}

impl<T> Default for ArraySequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The clone is trimmed to its length and starts over as a new owner at
/// version 0.
impl<T: Clone> Clone for ArraySequence<T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.live_slots().to_vec().into_boxed_slice(),
            len: self.len,
            version: Version::fresh(),
            lazy_default: false,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ArraySequence<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for ArraySequence<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq> Eq for ArraySequence<T> {}

impl<T> From<Vec<T>> for ArraySequence<T> {
    fn from(values: Vec<T>) -> Self {
        let slots: Box<[Option<T>]> = values.into_iter().map(Some).collect();
        Self {
            len: slots.len(),
            slots,
            version: Version::fresh(),
            lazy_default: false,
        }
    }
}

impl<T> FromIterator<T> for ArraySequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<T> Extend<T> for ArraySequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.push_all(iter) {
            panic!("{err}");
        }
    }
}

impl<T> Index<usize> for ArraySequence<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T> IndexMut<usize> for ArraySequence<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

// ============================================================================
// Iterators
// ============================================================================

/// Iterator over an [`ArraySequence`].
pub struct Iter<'a, T> {
    slots: slice::Iter<'a, Option<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.slots.next().and_then(Option::as_ref)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.slots.next_back().and_then(Option::as_ref)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
        }
    }
}

/// Mutable iterator over an [`ArraySequence`].
pub struct IterMut<'a, T> {
    slots: slice::IterMut<'a, Option<T>>,
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.slots.next().and_then(Option::as_mut)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.slots.next_back().and_then(Option::as_mut)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

/// Owning iterator over an [`ArraySequence`].
pub struct IntoIter<T> {
    slots: vec::IntoIter<Option<T>>,
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.slots.next().flatten()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.slots.next_back().flatten()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> IntoIterator for ArraySequence<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let mut slots = self.slots.into_vec();
        slots.truncate(self.len);
        IntoIter {
            slots: slots.into_iter(),
        }
    }
}

impl<'a, T> IntoIterator for &'a ArraySequence<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut ArraySequence<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> IterMut<'a, T> {
        self.iter_mut()
    }
}
