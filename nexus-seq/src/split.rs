//! Splittable traversal cursors.
//!
//! A split cursor is an [`Iterator`] that can also hand off a disjoint
//! *prefix* of its remaining elements through [`SplitCursor::try_split`].
//! The prefixes, in the order they were split off, followed by whatever the
//! original cursor still yields, reproduce the traversal order exactly. That
//! is the contract divide-and-conquer consumers such as
//! [`par`](crate::par) rely on.
//!
//! Cursors bind to the sequence lazily: size and start position are read on
//! first use, not at construction. They hold a shared borrow, so the sequence
//! cannot change structurally while any cursor is alive.
//!
//! | Cursor | Split strategy | Characteristics |
//! |--------|----------------|-----------------|
//! | [`ArraySplit`] | halve the index range | ORDERED, SIZED, SUBSIZED |
//! | [`LinkedSplit`] | copy a growing batch of references into a [`BatchSplit`] | ORDERED (+ SIZED, SUBSIZED once bound) |
//! | [`BatchSplit`] | halve the buffer | ORDERED, SIZED, SUBSIZED |
//!
//! ```
//! use nexus_seq::{ArraySequence, SplitCursor};
//!
//! let seq: ArraySequence<u32> = (0..8).collect();
//! let mut rest = seq.split_cursor();
//!
//! let prefix = rest.try_split().unwrap();
//! assert_eq!(prefix.copied().collect::<Vec<_>>(), vec![0, 1, 2, 3]);
//! assert_eq!(rest.copied().collect::<Vec<_>>(), vec![4, 5, 6, 7]);
//! ```

use bitflags::bitflags;

use crate::{ArraySequence, Key, LinkedSequence};

/// First batch size of a [`LinkedSplit`].
pub const DEFAULT_BATCH_UNIT: usize = 1 << 10;

/// Largest batch a [`LinkedSplit`] materializes in one split.
pub const DEFAULT_MAX_BATCH: usize = 1 << 25;

bitflags! {
    /// Static properties a split cursor reports about its elements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Characteristics: u8 {
        /// Elements come in a defined encounter order.
        const ORDERED = 1;
        /// `estimate_size` is exact.
        const SIZED = 1 << 1;
        /// Every cursor produced by `try_split` is SIZED too.
        const SUBSIZED = 1 << 2;
    }
}

/// An iterator that can split off a prefix of its remaining elements.
pub trait SplitCursor: Iterator + Sized {
    /// Cursor type of the split-off prefix.
    type Split: SplitCursor<Item = Self::Item>;

    /// Splits off a non-empty prefix of the remaining elements, keeping the
    /// rest. Returns `None` if the cursor declines to split.
    fn try_split(&mut self) -> Option<Self::Split>;

    /// Estimated number of remaining elements. Binds the cursor if needed.
    fn estimate_size(&mut self) -> usize;

    /// Remaining element count, if the cursor reports SIZED.
    fn exact_size(&mut self) -> Option<usize> {
        let size = self.estimate_size();
        self.characteristics()
            .contains(Characteristics::SIZED)
            .then_some(size)
    }

    /// Properties of this cursor's elements.
    fn characteristics(&self) -> Characteristics;
}

// ============================================================================
// Configuration
// ============================================================================

/// Batch sizing for [`LinkedSplit`].
///
/// The first split copies `batch_unit` references. Each following split
/// doubles that, up to `max_batch`, and never more than remain.
///
/// ```
/// use nexus_seq::SplitConfig;
///
/// let config = SplitConfig::default().with_batch_unit(64).with_max_batch(4096);
/// assert_eq!(config.batch_unit(), 64);
/// assert_eq!(config.max_batch(), 4096);
///
/// // max_batch never drops below batch_unit
/// let config = SplitConfig::default().with_batch_unit(100).with_max_batch(10);
/// assert_eq!(config.max_batch(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitConfig {
    batch_unit: usize,
    max_batch: usize,
}

impl SplitConfig {
    /// Default configuration: 1024 first batch, 2^25 cap.
    pub const fn new() -> Self {
        Self {
            batch_unit: DEFAULT_BATCH_UNIT,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }

    /// Sets the first batch size (at least 1). Raises `max_batch` to match
    /// if needed.
    pub const fn with_batch_unit(mut self, batch_unit: usize) -> Self {
        self.batch_unit = if batch_unit == 0 { 1 } else { batch_unit };
        if self.max_batch < self.batch_unit {
            self.max_batch = self.batch_unit;
        }
        self
    }

    /// Sets the batch cap (at least `batch_unit`).
    pub const fn with_max_batch(mut self, max_batch: usize) -> Self {
        self.max_batch = if max_batch < self.batch_unit {
            self.batch_unit
        } else {
            max_batch
        };
        self
    }

    /// First batch size.
    pub const fn batch_unit(&self) -> usize {
        self.batch_unit
    }

    /// Batch cap.
    pub const fn max_batch(&self) -> usize {
        self.max_batch
    }
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ArraySplit
// ============================================================================

/// Split cursor over an [`ArraySequence`], splitting by index arithmetic.
pub struct ArraySplit<'a, T> {
    seq: &'a ArraySequence<T>,
    index: usize,
    /// One past the last index; bound on first use.
    fence: Option<usize>,
}

impl<'a, T> ArraySplit<'a, T> {
    pub(crate) fn new(seq: &'a ArraySequence<T>) -> Self {
        Self {
            seq,
            index: 0,
            fence: None,
        }
    }

    #[inline]
    fn fence(&mut self) -> usize {
        *self.fence.get_or_insert_with(|| self.seq.len())
    }
}

impl<'a, T> Iterator for ArraySplit<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        if self.index >= self.fence() {
            return None;
        }
        let value = self.seq.live_slots()[self.index].as_ref();
        self.index += 1;
        value
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let fence = self.fence.unwrap_or(self.seq.len());
        let remaining = fence.saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T> SplitCursor for ArraySplit<'_, T> {
    type Split = Self;

    fn try_split(&mut self) -> Option<Self> {
        let lo = self.index;
        let mid = lo + (self.fence() - lo) / 2;
        if lo >= mid {
            return None;
        }
        self.index = mid;
        Some(Self {
            seq: self.seq,
            index: lo,
            fence: Some(mid),
        })
    }

    #[inline]
    fn estimate_size(&mut self) -> usize {
        self.fence() - self.index
    }

    #[inline]
    fn characteristics(&self) -> Characteristics {
        Characteristics::ORDERED | Characteristics::SIZED | Characteristics::SUBSIZED
    }
}

// ============================================================================
// BatchSplit
// ============================================================================

/// Split cursor over a materialized buffer of references.
pub struct BatchSplit<'a, T> {
    items: Vec<&'a T>,
    index: usize,
}

impl<'a, T> BatchSplit<'a, T> {
    pub(crate) fn new(items: Vec<&'a T>) -> Self {
        Self { items, index: 0 }
    }
}

impl<'a, T> Iterator for BatchSplit<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<&'a T> {
        let value = self.items.get(self.index).copied()?;
        self.index += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.items.len() - self.index;
        (remaining, Some(remaining))
    }
}

impl<T> SplitCursor for BatchSplit<'_, T> {
    type Split = Self;

    fn try_split(&mut self) -> Option<Self> {
        let lo = self.index;
        let mid = lo + (self.items.len() - lo) / 2;
        if lo >= mid {
            return None;
        }
        let rest = self.items.split_off(mid);
        let prefix = std::mem::replace(&mut self.items, rest);
        self.index = 0;
        Some(Self { items: prefix, index: lo })
    }

    #[inline]
    fn estimate_size(&mut self) -> usize {
        self.items.len() - self.index
    }

    #[inline]
    fn characteristics(&self) -> Characteristics {
        Characteristics::ORDERED | Characteristics::SIZED | Characteristics::SUBSIZED
    }
}

// ============================================================================
// LinkedSplit
// ============================================================================

/// Split cursor over a [`LinkedSequence`].
///
/// A linked sequence cannot be halved without walking it, so `try_split`
/// copies the next `batch` element references into a [`BatchSplit`] instead.
/// The batch grows geometrically so large sequences split into few, large
/// pieces.
pub struct LinkedSplit<'a, T, K: Key = u32> {
    seq: &'a LinkedSequence<T, K>,
    current: K,
    /// Remaining elements; `None` until bound.
    est: Option<usize>,
    batch: usize,
    config: SplitConfig,
}

impl<'a, T, K: Key> LinkedSplit<'a, T, K> {
    pub(crate) fn new(seq: &'a LinkedSequence<T, K>, config: SplitConfig) -> Self {
        Self {
            seq,
            current: K::NONE,
            est: None,
            batch: config.batch_unit(),
            config,
        }
    }

    fn bind(&mut self) -> usize {
        match self.est {
            Some(est) => est,
            None => {
                self.current = self.seq.head_key();
                let est = self.seq.len();
                self.est = Some(est);
                est
            }
        }
    }
}

impl<'a, T, K: Key> Iterator for LinkedSplit<'a, T, K> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let est = self.bind();
        if self.current.is_none() {
            return None;
        }
        let (value, next) = self.seq.entry(self.current);
        self.current = next;
        self.est = Some(est.saturating_sub(1));
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.est.unwrap_or(self.seq.len());
        (remaining, Some(remaining))
    }
}

impl<'a, T, K: Key> SplitCursor for LinkedSplit<'a, T, K> {
    type Split = BatchSplit<'a, T>;

    fn try_split(&mut self) -> Option<BatchSplit<'a, T>> {
        let est = self.bind();
        if est <= 1 || self.current.is_none() {
            return None;
        }

        let n = self.batch.min(est);
        let mut items = Vec::with_capacity(n);
        while items.len() < n && self.current.is_some() {
            let (value, next) = self.seq.entry(self.current);
            items.push(value);
            self.current = next;
        }

        let remaining = est - items.len();
        self.est = Some(remaining);
        self.batch = self.batch.saturating_mul(2).min(self.config.max_batch());
        tracing::trace!(batch = items.len(), remaining, "linked split batch");

        Some(BatchSplit::new(items))
    }

    #[inline]
    fn estimate_size(&mut self) -> usize {
        self.bind()
    }

    fn characteristics(&self) -> Characteristics {
        if self.est.is_some() {
            Characteristics::ORDERED | Characteristics::SIZED | Characteristics::SUBSIZED
        } else {
            Characteristics::ORDERED
        }
    }
}
