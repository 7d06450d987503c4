//! Doubly-linked sequence over a slab arena.
//!
//! Nodes are stored in a [`slab::Slab`] and refer to their neighbours by
//! key, with [`Key::NONE`] as the null link. Following `next` from the head
//! reaches the tail in exactly `len` steps, and `prev` walks it back. Removing
//! a node frees its slot (and drops the payload) immediately.
//!
//! Positional access walks from whichever end is closer, so `get(i)` costs
//! O(min(i, len - i)). The deque operations at either end are O(1).
//!
//! # Example
//!
//! ```
//! use nexus_seq::LinkedSequence;
//!
//! let mut seq: LinkedSequence<u32> = LinkedSequence::new();
//! seq.push_front(1);
//! seq.push_back(2);
//! seq.push_front(0);
//! assert_eq!(seq.to_vec(), vec![0, 1, 2]);
//!
//! assert_eq!(seq.remove_last(), Ok(2));
//! assert_eq!(seq.peek_first(), Some(&0));
//! assert_eq!(seq.iter().rev().copied().collect::<Vec<_>>(), vec![1, 0]);
//! ```

use core::fmt;
use core::mem;

use slab::Slab;

use crate::error::{check_element_index, check_position_index, check_range};
use crate::split::{LinkedSplit, SplitConfig};
use crate::{CursorPosition, Key, Membership, Result, SeqCursor, SeqError, Sequence, Version};

/// A node: payload plus neighbour links.
#[derive(Debug, Clone)]
struct Node<T, K> {
    value: T,
    prev: K,
    next: K,
}

/// End a positional lookup started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum End {
    Head,
    Tail,
}

/// Result of a positional lookup.
#[derive(Debug, Clone, Copy)]
struct Located<K> {
    key: K,
    from: End,
    steps: usize,
}

/// Doubly-linked sequence with O(1) operations at both ends.
///
/// `K` is the node key type (default `u32`). It bounds the maximum length to
/// [`Key::max_len`] nodes; smaller keys make every node smaller.
pub struct LinkedSequence<T, K: Key = u32> {
    nodes: Slab<Node<T, K>>,
    head: K,
    tail: K,
    version: Version,
}

impl<T, K: Key> LinkedSequence<T, K> {
    /// Creates an empty sequence.
    pub fn new() -> Self {
        Self {
            nodes: Slab::new(),
            head: K::NONE,
            tail: K::NONE,
            version: Version::fresh(),
        }
    }

    /// Creates an empty sequence with room for `capacity` nodes before the
    /// arena reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Slab::with_capacity(capacity),
            head: K::NONE,
            tail: K::NONE,
            version: Version::fresh(),
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the sequence holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
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

    // ========================================================================
    // Node plumbing
    // ========================================================================

    #[inline]
    fn node(&self, key: K) -> &Node<T, K> {
        &self.nodes[key.slot()]
    }

    #[inline]
    fn node_mut(&mut self, key: K) -> &mut Node<T, K> {
        &mut self.nodes[key.slot()]
    }

    /// Stores an unlinked node.
    fn alloc(&mut self, value: T) -> Result<K> {
        let slot = self.nodes.vacant_key();
        let Some(key) = K::try_from_slot(slot) else {
            return Err(SeqError::AllocationTooLarge {
                requested: slot.saturating_add(1),
                max: K::max_len(),
            });
        };
        self.nodes.insert(Node {
            value,
            prev: K::NONE,
            next: K::NONE,
        });
        Ok(key)
    }

    fn link_first(&mut self, key: K) {
        let old = self.head;
        let node = self.node_mut(key);
        node.prev = K::NONE;
        node.next = old;

        if old.is_some() {
            self.node_mut(old).prev = key;
        } else {
            self.tail = key;
        }
        self.head = key;
    }

    fn link_last(&mut self, key: K) {
        let old = self.tail;
        let node = self.node_mut(key);
        node.prev = old;
        node.next = K::NONE;

        if old.is_some() {
            self.node_mut(old).next = key;
        } else {
            self.head = key;
        }
        self.tail = key;
    }

    /// Links `key` immediately before `succ`, which must be linked.
    fn link_before(&mut self, key: K, succ: K) {
        let pred = self.node(succ).prev;
        let node = self.node_mut(key);
        node.prev = pred;
        node.next = succ;

        self.node_mut(succ).prev = key;
        if pred.is_some() {
            self.node_mut(pred).next = key;
        } else {
            self.head = key;
        }
    }

    /// Removes a node from the chain and the arena without touching the
    /// version.
    fn detach(&mut self, key: K) -> T {
        let node = self.nodes.remove(key.slot());

        if node.prev.is_some() {
            self.node_mut(node.prev).next = node.next;
        } else {
            self.head = node.next;
        }

        if node.next.is_some() {
            self.node_mut(node.next).prev = node.prev;
        } else {
            self.tail = node.prev;
        }

        node.value
    }

    fn unlink(&mut self, key: K) -> T {
        let value = self.detach(key);
        self.version.bump();
        value
    }

    /// Finds the node at `index < len`, walking from the nearer end.
    fn locate(&self, index: usize) -> Located<K> {
        let len = self.len();
        if index < (len >> 1) {
            let mut key = self.head;
            for _ in 0..index {
                key = self.node(key).next;
            }
            Located {
                key,
                from: End::Head,
                steps: index,
            }
        } else {
            let steps = len - 1 - index;
            let mut key = self.tail;
            for _ in 0..steps {
                key = self.node(key).prev;
            }
            Located {
                key,
                from: End::Tail,
                steps,
            }
        }
    }

    #[inline]
    fn node_at(&self, index: usize) -> K {
        let located = self.locate(index);
        tracing::trace!(
            index,
            from = ?located.from,
            steps = located.steps,
            "linked lookup"
        );
        located.key
    }

    /// Key of the first node, `K::NONE` when empty.
    #[inline]
    pub(crate) fn head_key(&self) -> K {
        self.head
    }

    /// Value and successor key of a linked node.
    #[inline]
    pub(crate) fn entry(&self, key: K) -> (&T, K) {
        let node = self.node(key);
        (&node.value, node.next)
    }

    // ========================================================================
    // Deque operations
    // ========================================================================

    /// Inserts `value` at the front.
    ///
    /// # Panics
    ///
    /// Panics if the key space is exhausted.
    pub fn push_front(&mut self, value: T) {
        if let Err(err) = self.try_push_front(value) {
            panic!("{err}");
        }
    }

    /// Inserts `value` at the back.
    ///
    /// # Panics
    ///
    /// Panics if the key space is exhausted.
    pub fn push_back(&mut self, value: T) {
        if let Err(err) = self.try_push_back(value) {
            panic!("{err}");
        }
    }

    /// Inserts `value` at the front.
    ///
    /// # Errors
    ///
    /// [`SeqError::AllocationTooLarge`] if the key space is exhausted.
    pub fn try_push_front(&mut self, value: T) -> Result<()> {
        let key = self.alloc(value)?;
        self.link_first(key);
        self.version.bump();
        Ok(())
    }

    /// Inserts `value` at the back.
    ///
    /// # Errors
    ///
    /// [`SeqError::AllocationTooLarge`] if the key space is exhausted.
    pub fn try_push_back(&mut self, value: T) -> Result<()> {
        let key = self.alloc(value)?;
        self.link_last(key);
        self.version.bump();
        Ok(())
    }

    /// Removes and returns the first element, or `None` if empty.
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.head;
        head.is_some().then(|| self.unlink(head))
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.tail;
        tail.is_some().then(|| self.unlink(tail))
    }

    /// Removes and returns the first element.
    ///
    /// # Errors
    ///
    /// [`SeqError::NoSuchElement`] if empty.
    pub fn remove_first(&mut self) -> Result<T> {
        self.pop_front().ok_or(SeqError::NoSuchElement)
    }

    /// Removes and returns the last element.
    ///
    /// # Errors
    ///
    /// [`SeqError::NoSuchElement`] if empty.
    pub fn remove_last(&mut self) -> Result<T> {
        self.pop_back().ok_or(SeqError::NoSuchElement)
    }

    /// Returns the first element, or `None` if empty.
    #[inline]
    pub fn peek_first(&self) -> Option<&T> {
        if self.head.is_some() {
            Some(&self.node(self.head).value)
        } else {
            None
        }
    }

    /// Returns the last element, or `None` if empty.
    #[inline]
    pub fn peek_last(&self) -> Option<&T> {
        if self.tail.is_some() {
            Some(&self.node(self.tail).value)
        } else {
            None
        }
    }

    /// Returns the first element.
    ///
    /// # Errors
    ///
    /// [`SeqError::NoSuchElement`] if empty.
    pub fn first(&self) -> Result<&T> {
        self.peek_first().ok_or(SeqError::NoSuchElement)
    }

    /// Returns the last element.
    ///
    /// # Errors
    ///
    /// [`SeqError::NoSuchElement`] if empty.
    pub fn last(&self) -> Result<&T> {
        self.peek_last().ok_or(SeqError::NoSuchElement)
    }

    /// Stack push: inserts at the front.
    pub fn push(&mut self, value: T) {
        self.push_front(value);
    }

    /// Stack pop: removes from the front.
    ///
    /// # Errors
    ///
    /// [`SeqError::NoSuchElement`] if empty.
    pub fn pop(&mut self) -> Result<T> {
        self.remove_first()
    }

    // ========================================================================
    // Positional operations
    // ========================================================================

    /// Returns the element at `index`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index < len`.
    pub fn get(&self, index: usize) -> Result<&T> {
        check_element_index(index, self.len())?;
        Ok(&self.node(self.node_at(index)).value)
    }

    /// Returns the element at `index` mutably.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index < len`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        check_element_index(index, self.len())?;
        let key = self.node_at(index);
        Ok(&mut self.node_mut(key).value)
    }

    /// Replaces the element at `index`, returning the previous one.
    ///
    /// Not a structural change.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let slot = self.get_mut(index)?;
        Ok(mem::replace(slot, value))
    }

    /// Inserts `value` at `index`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index <= len`,
    /// [`SeqError::AllocationTooLarge`] if the key space is exhausted.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.len();
        check_position_index(index, len)?;
        if index == len {
            return self.try_push_back(value);
        }

        let succ = self.node_at(index);
        let key = self.alloc(value)?;
        self.link_before(key, succ);
        self.version.bump();
        Ok(())
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index < len`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        check_element_index(index, self.len())?;
        let key = self.node_at(index);
        Ok(self.unlink(key))
    }

    /// Splices every value of `values` in at `index`, preserving their order.
    /// Returns `true` if anything was inserted.
    ///
    /// The successor is located once and the new run is linked in a single
    /// pass. The version bumps once.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] unless `index <= len`.
    /// [`SeqError::AllocationTooLarge`] if the key space runs out part-way;
    /// the values linked so far stay in place.
    pub fn insert_all<I>(&mut self, index: usize, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
    {
        let len = self.len();
        check_position_index(index, len)?;

        let succ = if index == len {
            K::NONE
        } else {
            self.node_at(index)
        };
        let mut pred = if succ.is_some() {
            self.node(succ).prev
        } else {
            self.tail
        };

        let mut inserted = false;
        let mut outcome = Ok(());
        for value in values {
            let key = match self.alloc(value) {
                Ok(key) => key,
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            };
            let node = self.node_mut(key);
            node.prev = pred;
            node.next = succ;
            if pred.is_some() {
                self.node_mut(pred).next = key;
            } else {
                self.head = key;
            }
            pred = key;
            inserted = true;
        }

        if inserted {
            if succ.is_some() {
                self.node_mut(succ).prev = pred;
            } else {
                self.tail = pred;
            }
            self.version.bump();
        }
        outcome.map(|()| inserted)
    }

    /// Appends every value of `values`. Returns `true` if anything was
    /// appended.
    pub fn push_all<I>(&mut self, values: I) -> Result<bool>
    where
        I: IntoIterator<Item = T>,
    {
        self.insert_all(self.len(), values)
    }

    /// Removes the elements in `from..to` in one walk.
    ///
    /// # Errors
    ///
    /// [`SeqError::IndexOutOfRange`] if `to > len`, [`SeqError::IllegalRange`]
    /// if `from > to`.
    pub fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        check_range(from, to, self.len())?;
        if from == to {
            return Ok(());
        }

        let mut key = self.node_at(from);
        for _ in from..to {
            let next = self.node(key).next;
            self.detach(key);
            key = next;
        }
        self.version.bump();
        Ok(())
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.head = K::NONE;
        self.tail = K::NONE;
        self.version.bump();
    }

    /// Removes the first element equal to `value`. Returns `true` if one was
    /// found.
    pub fn remove_value(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let mut key = self.head;
        while key.is_some() {
            let node = self.node(key);
            if node.value == *value {
                self.unlink(key);
                return true;
            }
            key = node.next;
        }
        false
    }

    /// Same as [`remove_value`](Self::remove_value).
    pub fn remove_first_occurrence(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.remove_value(value)
    }

    /// Removes the last element equal to `value`, searching from the tail.
    /// Returns `true` if one was found.
    pub fn remove_last_occurrence(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        let mut key = self.tail;
        while key.is_some() {
            let node = self.node(key);
            if node.value == *value {
                self.unlink(key);
                return true;
            }
            key = node.prev;
        }
        false
    }

    /// Keeps only the elements for which `keep` returns `true`. Returns
    /// `true` if anything was removed; the version then bumps once.
    pub fn retain<F>(&mut self, mut keep: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        let mut removed = false;
        let mut key = self.head;
        while key.is_some() {
            let node = self.node(key);
            let next = node.next;
            if !keep(&node.value) {
                self.detach(key);
                removed = true;
            }
            key = next;
        }
        if removed {
            self.version.bump();
        }
        removed
    }

    /// Removes every element matching `pred`.
    pub fn remove_if<F>(&mut self, mut pred: F) -> bool
    where
        F: FnMut(&T) -> bool,
    {
        self.retain(|v| !pred(v))
    }

    /// Removes every element contained in `set`.
    pub fn remove_all<C>(&mut self, set: &C) -> bool
    where
        C: Membership<T> + ?Sized,
    {
        self.retain(|v| !set.contains_value(v))
    }

    /// Removes every element *not* contained in `set`.
    pub fn retain_all<C>(&mut self, set: &C) -> bool
    where
        C: Membership<T> + ?Sized,
    {
        self.retain(|v| set.contains_value(v))
    }

    // ========================================================================
    // Search and copying
    // ========================================================================

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
        let len = self.len();
        if out.len() < len {
            out.resize_with(len, || None);
        }
        for (dst, src) in out.iter_mut().zip(self.iter()) {
            *dst = Some(src.clone());
        }
        if out.len() > len {
            out[len] = None;
        }
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns a front-to-back iterator. Use `.rev()` for back-to-front.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, K> {
        Iter {
            nodes: &self.nodes,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }

    /// Calls `f` on every element, front to back, mutably.
    pub fn for_each_mut<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut T),
    {
        let mut key = self.head;
        while key.is_some() {
            let node = self.node_mut(key);
            f(&mut node.value);
            key = node.next;
        }
    }

    /// Returns a splittable cursor with the default batch configuration.
    #[inline]
    pub fn split_cursor(&self) -> LinkedSplit<'_, T, K> {
        LinkedSplit::new(self, SplitConfig::default())
    }

    /// Returns a splittable cursor with a custom batch configuration.
    #[inline]
    pub fn split_cursor_with(&self, config: SplitConfig) -> LinkedSplit<'_, T, K> {
        LinkedSplit::new(self, config)
    }
}

// ============================================================================
// Cursor
// ============================================================================

/// List cursor for [`LinkedSequence`], tracking node keys instead of
/// indices so each step is O(1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedCursor<K: Key = u32> {
    /// Node `next` would return; `NONE` at the end.
    next: K,
    next_index: usize,
    /// Node last returned; `NONE` if there is none to operate on.
    last: K,
    expected: Version,
}

impl<K: Key> LinkedCursor<K> {
    fn new<T>(seq: &LinkedSequence<T, K>, index: usize) -> Result<Self> {
        let len = seq.len();
        check_position_index(index, len)?;
        Ok(Self {
            next: if index == len {
                K::NONE
            } else {
                seq.node_at(index)
            },
            next_index: index,
            last: K::NONE,
            expected: seq.version,
        })
    }
}

impl<K: Key> CursorPosition for LinkedCursor<K> {
    #[inline]
    fn has_previous(&self) -> bool {
        self.next_index > 0
    }

    #[inline]
    fn next_index(&self) -> usize {
        self.next_index
    }
}

impl<T, K: Key> SeqCursor<T, LinkedSequence<T, K>> for LinkedCursor<K> {
    #[inline]
    fn has_next(&self, seq: &LinkedSequence<T, K>) -> bool {
        self.next_index < seq.len()
    }

    fn next<'s>(&mut self, seq: &'s LinkedSequence<T, K>) -> Result<&'s T> {
        self.expected.check(seq.version)?;
        if self.next_index >= seq.len() || self.next.is_none() {
            return Err(SeqError::NoSuchElement);
        }

        let node = seq.node(self.next);
        self.last = self.next;
        self.next = node.next;
        self.next_index += 1;
        Ok(&node.value)
    }

    fn previous<'s>(&mut self, seq: &'s LinkedSequence<T, K>) -> Result<&'s T> {
        self.expected.check(seq.version)?;
        if self.next_index == 0 {
            return Err(SeqError::NoSuchElement);
        }

        let key = if self.next.is_none() {
            seq.tail
        } else {
            seq.node(self.next).prev
        };
        self.next = key;
        self.last = key;
        self.next_index -= 1;
        Ok(&seq.node(key).value)
    }

    fn remove(&mut self, seq: &mut LinkedSequence<T, K>) -> Result<T> {
        if self.last.is_none() {
            return Err(SeqError::IllegalCursorState);
        }
        self.expected.check(seq.version)?;

        let last = self.last;
        let after = seq.node(last).next;
        let value = seq.unlink(last);
        if self.next == last {
            // removed after `previous`
            self.next = after;
        } else {
            self.next_index -= 1;
        }
        self.last = K::NONE;
        self.expected = seq.version;
        Ok(value)
    }

    fn set(&mut self, seq: &mut LinkedSequence<T, K>, value: T) -> Result<T> {
        if self.last.is_none() {
            return Err(SeqError::IllegalCursorState);
        }
        self.expected.check(seq.version)?;

        Ok(mem::replace(&mut seq.node_mut(self.last).value, value))
    }

    fn add(&mut self, seq: &mut LinkedSequence<T, K>, value: T) -> Result<()> {
        self.expected.check(seq.version)?;

        let key = seq.alloc(value)?;
        if self.next.is_none() {
            seq.link_last(key);
        } else {
            seq.link_before(key, self.next);
        }
        seq.version.bump();

        self.last = K::NONE;
        self.next_index += 1;
        self.expected = seq.version;
        Ok(())
    }
}

// ============================================================================
// Trait impls
// ============================================================================

impl<T, K: Key> Sequence<T> for LinkedSequence<T, K> {
    type Cursor = LinkedCursor<K>;

    #[inline]
    fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    fn version(&self) -> Version {
        self.version
    }

    fn get(&self, index: usize) -> Result<&T> {
        LinkedSequence::get(self, index)
    }

    fn set(&mut self, index: usize, value: T) -> Result<T> {
        LinkedSequence::set(self, index, value)
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        LinkedSequence::insert(self, index, value)
    }

    fn remove_at(&mut self, index: usize) -> Result<T> {
        LinkedSequence::remove_at(self, index)
    }

    fn push(&mut self, value: T) -> Result<()> {
        self.try_push_back(value)
    }

    fn remove_range(&mut self, from: usize, to: usize) -> Result<()> {
        LinkedSequence::remove_range(self, from, to)
    }

    fn clear(&mut self) -> Result<()> {
        LinkedSequence::clear(self);
        Ok(())
    }

    fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        LinkedSequence::index_of(self, value)
    }

    fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        LinkedSequence::last_index_of(self, value)
    }

    fn cursor_at(&self, index: usize) -> Result<LinkedCursor<K>> {
        LinkedCursor::new(self, index)
    }
}

impl<T: PartialEq, K: Key> Membership<T> for LinkedSequence<T, K> {
    #[inline]
    fn contains_value(&self, value: &T) -> bool {
        self.contains(value)
    }
}

impl<T, K: Key> Default for LinkedSequence<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

/// The clone is relinked in traversal order and starts over as a new owner
/// at version 0.
impl<T: Clone, K: Key> Clone for LinkedSequence<T, K> {
    fn clone(&self) -> Self {
        let mut copy = Self::with_capacity(self.len());
        for value in self.iter() {
            copy.push_back(value.clone());
        }
        copy.version = Version::fresh();
        copy
    }
}

impl<T: fmt::Debug, K: Key> fmt::Debug for LinkedSequence<T, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, K: Key> PartialEq for LinkedSequence<T, K> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Eq, K: Key> Eq for LinkedSequence<T, K> {}

impl<T, K: Key> FromIterator<T> for LinkedSequence<T, K> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut seq = Self::new();
        seq.extend(iter);
        seq
    }
}

impl<T, K: Key> Extend<T> for LinkedSequence<T, K> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        if let Err(err) = self.push_all(iter) {
            panic!("{err}");
        }
    }
}

// ============================================================================
// Iterators
// ============================================================================

/// Double-ended iterator over a [`LinkedSequence`].
pub struct Iter<'a, T, K: Key = u32> {
    nodes: &'a Slab<Node<T, K>>,
    front: K,
    back: K,
    remaining: usize,
}

impl<'a, T, K: Key> Iterator for Iter<'a, T, K> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.front.slot()];
        self.front = node.next;
        self.remaining -= 1;
        Some(&node.value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, K: Key> DoubleEndedIterator for Iter<'_, T, K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let node = &self.nodes[self.back.slot()];
        self.back = node.prev;
        self.remaining -= 1;
        Some(&node.value)
    }
}

impl<T, K: Key> ExactSizeIterator for Iter<'_, T, K> {}

impl<T, K: Key> Clone for Iter<'_, T, K> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

/// Owning iterator over a [`LinkedSequence`].
pub struct IntoIter<T, K: Key = u32> {
    seq: LinkedSequence<T, K>,
}

impl<T, K: Key> Iterator for IntoIter<T, K> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.seq.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.seq.len();
        (len, Some(len))
    }
}

impl<T, K: Key> DoubleEndedIterator for IntoIter<T, K> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        self.seq.pop_back()
    }
}

impl<T, K: Key> ExactSizeIterator for IntoIter<T, K> {}

impl<T, K: Key> IntoIterator for LinkedSequence<T, K> {
    type Item = T;
    type IntoIter = IntoIter<T, K>;

    fn into_iter(self) -> IntoIter<T, K> {
        IntoIter { seq: self }
    }
}

impl<'a, T, K: Key> IntoIterator for &'a LinkedSequence<T, K> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, K>;

    fn into_iter(self) -> Iter<'a, T, K> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn seq_of(values: &[u32]) -> LinkedSequence<u32> {
        values.iter().copied().collect()
    }

    /// Walks both directions and checks the links agree with `len`.
    fn assert_linked<T: fmt::Debug + PartialEq + Clone, K: Key>(
        seq: &LinkedSequence<T, K>,
        expected: &[T],
    ) {
        assert_eq!(seq.len(), expected.len());

        let mut forward = Vec::new();
        let mut key = seq.head;
        let mut prev = K::NONE;
        while key.is_some() {
            let node = seq.node(key);
            assert!(node.prev == prev, "broken prev link");
            forward.push(node.value.clone());
            prev = key;
            key = node.next;
        }
        assert!(seq.tail == prev, "tail is not the last node");
        assert_eq!(forward, expected);

        let backward: Vec<T> = seq.iter().rev().cloned().collect();
        let mut reversed = expected.to_vec();
        reversed.reverse();
        assert_eq!(backward, reversed);
    }

    // ========================================================================
    // Deque operations
    // ========================================================================

    #[test]
    fn new_is_empty() {
        let seq: LinkedSequence<u32> = LinkedSequence::new();
        assert!(seq.is_empty());
        assert_eq!(seq.peek_first(), None);
        assert_eq!(seq.peek_last(), None);
        assert_eq!(seq.first(), Err(SeqError::NoSuchElement));
        assert_eq!(seq.last(), Err(SeqError::NoSuchElement));
        assert!(seq.head.is_none());
        assert!(seq.tail.is_none());
    }

    #[test]
    fn push_both_ends() {
        let mut seq = LinkedSequence::<u32>::new();
        seq.push_front(1);
        seq.push_back(2);
        seq.push_front(0);
        assert_linked(&seq, &[0, 1, 2]);

        assert_eq!(seq.remove_last(), Ok(2));
        assert_linked(&seq, &[0, 1]);
        assert_eq!(seq.peek_first(), Some(&0));
        assert_eq!(seq.peek_last(), Some(&1));
    }

    #[test]
    fn pop_until_empty() {
        let mut seq = seq_of(&[1, 2, 3]);
        assert_eq!(seq.pop_front(), Some(1));
        assert_eq!(seq.pop_back(), Some(3));
        assert_eq!(seq.pop_back(), Some(2));
        assert_eq!(seq.pop_front(), None);
        assert_eq!(seq.pop_back(), None);
        assert_eq!(seq.remove_first(), Err(SeqError::NoSuchElement));
        assert_eq!(seq.remove_last(), Err(SeqError::NoSuchElement));
        assert!(seq.head.is_none() && seq.tail.is_none());
    }

    #[test]
    fn stack_operations() {
        let mut seq = LinkedSequence::<u32>::new();
        seq.push(1);
        seq.push(2);
        assert_eq!(seq.pop(), Ok(2));
        assert_eq!(seq.pop(), Ok(1));
        assert_eq!(seq.pop(), Err(SeqError::NoSuchElement));
    }

    #[test]
    fn occurrences() {
        let mut seq = seq_of(&[1, 2, 1, 2, 1]);
        assert!(seq.remove_first_occurrence(&2));
        assert_linked(&seq, &[1, 1, 2, 1]);
        assert!(seq.remove_last_occurrence(&1));
        assert_linked(&seq, &[1, 1, 2]);
        assert!(!seq.remove_last_occurrence(&7));
    }

    // ========================================================================
    // Positional operations
    // ========================================================================

    #[test]
    fn get_set_insert_remove() {
        let mut seq = seq_of(&[10, 20, 40]);
        assert_eq!(seq.get(1), Ok(&20));
        assert_eq!(
            seq.get(3),
            Err(SeqError::IndexOutOfRange { index: 3, len: 3 })
        );

        seq.insert(2, 30).unwrap();
        seq.insert(0, 0).unwrap();
        seq.insert(5, 50).unwrap();
        assert_linked(&seq, &[0, 10, 20, 30, 40, 50]);

        let before = seq.version();
        assert_eq!(seq.set(3, 33), Ok(30));
        assert_eq!(seq.version(), before);

        assert_eq!(seq.remove_at(0), Ok(0));
        assert_eq!(seq.remove_at(4), Ok(50));
        assert_eq!(seq.remove_at(1), Ok(20));
        assert_linked(&seq, &[10, 33, 40]);
        assert_eq!(
            seq.insert(4, 0),
            Err(SeqError::IndexOutOfRange { index: 4, len: 3 })
        );
    }

    #[test]
    fn lookup_walks_from_nearer_end() {
        let seq: LinkedSequence<u32> = (0..10).collect();

        let low = seq.locate(2);
        assert_eq!(low.from, End::Head);
        assert_eq!(low.steps, 2);
        assert_eq!(seq.node(low.key).value, 2);

        let high = seq.locate(8);
        assert_eq!(high.from, End::Tail);
        assert_eq!(high.steps, 1);
        assert_eq!(seq.node(high.key).value, 8);

        // midpoint goes to the tail side
        assert_eq!(seq.locate(5).from, End::Tail);
        assert_eq!(seq.locate(4).from, End::Head);

        for i in 0..10 {
            assert!(seq.locate(i).steps <= 5);
        }
    }

    #[test]
    fn insert_all_splices_once() {
        let mut seq = seq_of(&[1, 5]);
        let before = seq.version();
        assert_eq!(seq.insert_all(1, [2, 3, 4]), Ok(true));
        assert_eq!(seq.version().get(), before.get() + 1);
        assert_linked(&seq, &[1, 2, 3, 4, 5]);

        assert_eq!(seq.insert_all(0, [0]), Ok(true));
        assert_eq!(seq.push_all([6, 7]), Ok(true));
        assert_eq!(seq.insert_all(3, []), Ok(false));
        assert_linked(&seq, &[0, 1, 2, 3, 4, 5, 6, 7]);

        let mut empty = LinkedSequence::<u32>::new();
        assert_eq!(empty.insert_all(0, [1, 2]), Ok(true));
        assert_linked(&empty, &[1, 2]);
    }

    #[test]
    fn remove_range_one_walk() {
        let mut seq: LinkedSequence<u32> = (0..8).collect();
        let before = seq.version();
        seq.remove_range(2, 6).unwrap();
        assert_eq!(seq.version().get(), before.get() + 1);
        assert_linked(&seq, &[0, 1, 6, 7]);

        seq.remove_range(0, 4).unwrap();
        assert_linked(&seq, &[]);
        assert_eq!(
            seq.remove_range(0, 1),
            Err(SeqError::IndexOutOfRange { index: 1, len: 0 })
        );
    }

    #[test]
    fn clear_releases_nodes() {
        let mut seq = seq_of(&[1, 2, 3]);
        seq.clear();
        assert_linked(&seq, &[]);
        seq.push_back(4);
        assert_linked(&seq, &[4]);
    }

    #[test]
    fn retain_and_bulk_removal() {
        let mut seq: LinkedSequence<u32> = (0..10).collect();
        assert!(seq.remove_if(|v| v.is_multiple_of(2)));
        assert_linked(&seq, &[1, 3, 5, 7, 9]);

        let set: HashSet<u32> = [3, 7].into_iter().collect();
        assert!(seq.remove_all(&set));
        assert_linked(&seq, &[1, 5, 9]);

        assert!(seq.retain_all(&[5u32, 9][..]));
        assert_linked(&seq, &[5, 9]);

        let before = seq.version();
        assert!(!seq.retain(|_| true));
        assert_eq!(seq.version(), before);
    }

    #[test]
    fn unlinked_payload_is_dropped() {
        use std::rc::Rc;

        let tracked = Rc::new(());
        let mut seq: LinkedSequence<Rc<()>> = (0..3).map(|_| Rc::clone(&tracked)).collect();
        seq.remove_at(1).unwrap();
        assert_eq!(Rc::strong_count(&tracked), 3);
        seq.clear();
        assert_eq!(Rc::strong_count(&tracked), 1);
    }

    #[test]
    fn small_keys_exhaust() {
        let mut seq: LinkedSequence<(), u16> = LinkedSequence::new();
        for _ in 0..u16::MAX {
            seq.try_push_back(()).unwrap();
        }
        assert_eq!(
            seq.try_push_back(()),
            Err(SeqError::AllocationTooLarge {
                requested: u16::MAX as usize + 1,
                max: u16::MAX as usize,
            })
        );
        assert_eq!(seq.len(), u16::MAX as usize);

        // freed slots are reused
        seq.pop_front();
        assert!(seq.try_push_back(()).is_ok());
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    #[test]
    fn cursor_walks_both_ways() {
        let seq = seq_of(&[1, 2, 3]);
        let mut cursor = seq.cursor_at(1).unwrap();

        assert_eq!(cursor.next(&seq), Ok(&2));
        assert_eq!(cursor.next(&seq), Ok(&3));
        assert_eq!(cursor.next(&seq), Err(SeqError::NoSuchElement));
        assert_eq!(cursor.previous(&seq), Ok(&3));
        assert_eq!(cursor.previous(&seq), Ok(&2));
        assert_eq!(cursor.previous(&seq), Ok(&1));
        assert_eq!(cursor.previous(&seq), Err(SeqError::NoSuchElement));
    }

    #[test]
    fn cursor_remove_after_next_and_previous() {
        let mut seq = seq_of(&[1, 2, 3, 4]);
        let mut cursor = seq.cursor_at(0).unwrap();

        cursor.next(&seq).unwrap();
        cursor.next(&seq).unwrap();
        assert_eq!(cursor.remove(&mut seq), Ok(2));
        assert_eq!(cursor.next_index(), 1);

        assert_eq!(cursor.next(&seq), Ok(&3));
        assert_eq!(cursor.previous(&seq), Ok(&3));
        assert_eq!(cursor.remove(&mut seq), Ok(3));
        assert_eq!(cursor.next_index(), 1);
        assert_eq!(cursor.next(&seq), Ok(&4));

        assert_linked(&seq, &[1, 4]);
    }

    #[test]
    fn cursor_add_and_set() {
        let mut seq = seq_of(&[1, 4]);
        let mut cursor = seq.cursor_at(1).unwrap();

        cursor.add(&mut seq, 2).unwrap();
        cursor.add(&mut seq, 3).unwrap();
        assert_eq!(cursor.next_index(), 3);
        assert_eq!(cursor.remove(&mut seq), Err(SeqError::IllegalCursorState));

        assert_eq!(cursor.next(&seq), Ok(&4));
        assert_eq!(cursor.set(&mut seq, 40), Ok(4));
        cursor.add(&mut seq, 5).unwrap();
        assert!(!cursor.has_next(&seq));

        assert_linked(&seq, &[1, 2, 3, 40, 5]);
    }

    #[test]
    fn cursor_detects_direct_mutation() {
        let mut seq = seq_of(&[1, 2, 3]);
        let mut cursor = seq.cursor_at(0).unwrap();
        cursor.next(&seq).unwrap();

        seq.push_front(0);
        assert!(matches!(
            cursor.next(&seq),
            Err(SeqError::ConcurrentModification { .. })
        ));
        assert!(matches!(
            cursor.add(&mut seq, 9),
            Err(SeqError::ConcurrentModification { .. })
        ));
    }

    // ========================================================================
    // Iteration and trait impls
    // ========================================================================

    #[test]
    fn iter_meets_in_the_middle() {
        let seq = seq_of(&[1, 2, 3, 4]);
        let mut iter = seq.iter();
        assert_eq!(iter.len(), 4);
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next_back(), Some(&4));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next_back(), Some(&3));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn into_iter_both_ends() {
        let seq = seq_of(&[1, 2, 3]);
        let mut iter = seq.into_iter();
        assert_eq!(iter.next_back(), Some(3));
        assert_eq!(iter.collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn for_each_mut_updates_in_order() {
        let mut seq = seq_of(&[1, 2, 3]);
        let mut order = Vec::new();
        seq.for_each_mut(|v| {
            order.push(*v);
            *v *= 10;
        });
        assert_eq!(order, vec![1, 2, 3]);
        assert_linked(&seq, &[10, 20, 30]);
    }

    #[test]
    fn clone_resets_version() {
        let mut seq = seq_of(&[3, 1, 2]);
        seq.remove_at(0).unwrap();
        seq.push_front(3);
        let copy = seq.clone();
        assert_eq!(copy, seq);
        assert_eq!(copy.version().get(), 0);
        assert_ne!(copy.version().owner(), seq.version().owner());
        assert_linked(&copy, &[3, 1, 2]);
        assert_eq!(format!("{copy:?}"), "[3, 1, 2]");
    }

    #[test]
    fn search() {
        let seq = seq_of(&[5, 6, 5]);
        assert_eq!(seq.index_of(&5), Some(0));
        assert_eq!(seq.last_index_of(&5), Some(2));
        assert!(seq.contains(&6));
        assert!(!seq.contains(&7));
    }

    // ========================================================================
    // Latency
    // ========================================================================

    #[test]
    #[ignore]
    fn push_pop_latency() {
        use hdrhistogram::Histogram;
        use std::time::Instant;

        const WARMUP: usize = 10_000;
        const SAMPLES: usize = 100_000;

        let mut hist = Histogram::<u64>::new(3).unwrap();
        let mut seq: LinkedSequence<u64> = LinkedSequence::with_capacity(WARMUP);

        for i in 0..WARMUP as u64 {
            seq.push_back(i);
        }

        for i in 0..SAMPLES as u64 {
            let start = Instant::now();
            seq.push_back(std::hint::black_box(i));
            let _ = std::hint::black_box(seq.pop_front());
            let elapsed = start.elapsed().as_nanos() as u64;
            hist.record(elapsed).unwrap();
        }

        println!("\nLinkedSequence push_back + pop_front latency (ns)");
        println!("  p50:   {}", hist.value_at_quantile(0.50));
        println!("  p99:   {}", hist.value_at_quantile(0.99));
        println!("  p99.9: {}", hist.value_at_quantile(0.999));
        println!("  max:   {}", hist.max());
    }
}
