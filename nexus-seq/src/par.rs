//! Rayon bridge for split cursors.
//!
//! Any [`SplitCursor`] whose items are `Send` can drive a rayon
//! [`ParallelIterator`]: rayon asks the producer to split, the cursor hands
//! off a prefix, and each piece is folded sequentially. Both sequences
//! implement [`IntoParallelIterator`] for shared references, so `par_iter()`
//! works directly.
//!
//! ```
//! use nexus_seq::{ArraySequence, LinkedSequence};
//! use rayon::prelude::*;
//!
//! let array: ArraySequence<u64> = (1..=1000).collect();
//! assert_eq!(array.par_iter().sum::<u64>(), 500_500);
//!
//! let linked: LinkedSequence<u64> = (1..=1000).collect();
//! let doubled: Vec<u64> = linked.par_iter().map(|v| v * 2).collect();
//! assert_eq!(doubled[..3], [2, 4, 6]);
//! ```

use rayon::iter::plumbing::{Folder, UnindexedConsumer, UnindexedProducer, bridge_unindexed};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::split::{ArraySplit, LinkedSplit, SplitCursor};
use crate::{ArraySequence, Key, LinkedSequence};

/// Parallel iterator over the elements of a split cursor.
pub struct ParIter<C> {
    cursor: C,
}

impl<C: SplitCursor> ParIter<C> {
    /// Wraps a split cursor.
    pub fn new(cursor: C) -> Self {
        Self { cursor }
    }
}

impl<C> ParallelIterator for ParIter<C>
where
    C: SplitCursor + Send,
    C::Split: SplitCursor<Item = C::Item, Split = C::Split> + Send,
    C::Item: Send,
{
    type Item = C::Item;

    fn drive_unindexed<R>(self, consumer: R) -> R::Result
    where
        R: UnindexedConsumer<Self::Item>,
    {
        bridge_unindexed(Part::<C>::Whole(self.cursor), consumer)
    }
}

/// A producer piece: the original cursor or a prefix split off it.
enum Part<C: SplitCursor> {
    Whole(C),
    Prefix(C::Split),
}

impl<C> UnindexedProducer for Part<C>
where
    C: SplitCursor + Send,
    C::Split: SplitCursor<Item = C::Item, Split = C::Split> + Send,
    C::Item: Send,
{
    type Item = C::Item;

    fn split(self) -> (Self, Option<Self>) {
        match self {
            Part::Whole(mut rest) => match rest.try_split() {
                Some(prefix) => (Part::Prefix(prefix), Some(Part::Whole(rest))),
                None => (Part::Whole(rest), None),
            },
            Part::Prefix(mut rest) => match rest.try_split() {
                Some(prefix) => (Part::Prefix(prefix), Some(Part::Prefix(rest))),
                None => (Part::Prefix(rest), None),
            },
        }
    }

    fn fold_with<F>(self, folder: F) -> F
    where
        F: Folder<Self::Item>,
    {
        match self {
            Part::Whole(cursor) => folder.consume_iter(cursor),
            Part::Prefix(cursor) => folder.consume_iter(cursor),
        }
    }
}

impl<'a, T: Sync + 'a> IntoParallelIterator for &'a ArraySequence<T> {
    type Iter = ParIter<ArraySplit<'a, T>>;
    type Item = &'a T;

    fn into_par_iter(self) -> Self::Iter {
        ParIter::new(self.split_cursor())
    }
}

impl<'a, T: Sync + 'a, K: Key + Send + Sync + 'a> IntoParallelIterator for &'a LinkedSequence<T, K> {
    type Iter = ParIter<LinkedSplit<'a, T, K>>;
    type Item = &'a T;

    fn into_par_iter(self) -> Self::Iter {
        ParIter::new(self.split_cursor())
    }
}
