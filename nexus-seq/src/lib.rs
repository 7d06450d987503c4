//! Indexed sequences with fail-fast cursors, aliasing views and splittable
//! traversal.
//!
//! Two interchangeable implementations of a mutable ordered sequence:
//!
//! ```text
//! ArraySequence<T>     - contiguous slot buffer, amortized O(1) push
//! LinkedSequence<T, K> - doubly-linked nodes in a slab arena, O(1) at both ends
//! ```
//!
//! Both implement [`Sequence`], so the cursor protocol, views and the
//! cursor-driven algorithms in [`sequence`] work on either.
//!
//! # Quick Start
//!
//! ```
//! use nexus_seq::{ArraySequence, LinkedSequence, Sequence};
//!
//! let mut array: ArraySequence<u32> = ArraySequence::new();
//! array.push(1);
//! array.push(2);
//! array.insert(1, 9).unwrap();
//! assert_eq!(array.to_vec(), vec![1, 9, 2]);
//!
//! let mut linked: LinkedSequence<u32> = LinkedSequence::new();
//! linked.push_front(1);
//! linked.push_back(2);
//! assert_eq!(linked.remove_last(), Ok(2));
//! assert_eq!(linked.peek_first(), Some(&1));
//! ```
//!
//! # Version Discipline
//!
//! Every sequence carries a [`Version`] that bumps exactly once per
//! structural change. Cursors ([`SeqCursor`]) and views ([`View`]) are
//! detached handles: they capture the version, are handed the sequence on
//! every call, and fail with [`SeqError::ConcurrentModification`] if the
//! sequence changed behind their back. Replacing an element with `set` is not
//! structural and never invalidates anything.
//!
//! ```
//! use nexus_seq::{LinkedSequence, SeqCursor, SeqError, Sequence};
//!
//! let mut seq: LinkedSequence<u32> = (0..4).collect();
//! let mut cursor = seq.cursor_at(0).unwrap();
//! assert_eq!(cursor.next(&seq), Ok(&0));
//!
//! seq.push_back(4);
//! assert!(matches!(
//!     cursor.next(&seq),
//!     Err(SeqError::ConcurrentModification { .. })
//! ));
//! ```
//!
//! # Split Traversal
//!
//! [`SplitCursor`]s partition a sequence into ordered, disjoint prefixes for
//! divide-and-conquer consumption. With the `rayon` feature both sequences
//! implement `IntoParallelIterator` for shared references.
//!
//! | Cursor | Split strategy |
//! |--------|----------------|
//! | [`ArraySplit`] | halves the remaining index range |
//! | [`LinkedSplit`] | hands off batches of growing size |
//! | [`BatchSplit`] | halves a materialized batch |
//!
//! # Feature Flags
//!
//! - `rayon` (default) - parallel iteration over both sequences
//! - `serde` (default) - serialize both sequences as a plain serde sequence

#![warn(missing_docs)]

pub mod array;
pub mod cursor;
pub mod error;
pub mod key;
pub mod linked;
#[cfg(feature = "rayon")]
pub mod par;
pub mod sequence;
#[cfg(feature = "serde")]
mod serde_impl;
pub mod split;
pub mod version;
pub mod view;

pub use array::{ArraySequence, DEFAULT_CAPACITY, max_capacity};
pub use cursor::{CursorPosition, IndexCursor, SeqCursor};
pub use error::{Result, SeqError};
pub use key::Key;
pub use linked::{LinkedCursor, LinkedSequence};
pub use sequence::{Membership, Sequence};
pub use split::{ArraySplit, BatchSplit, Characteristics, LinkedSplit, SplitConfig, SplitCursor};
pub use version::Version;
pub use view::{View, ViewIter, ViewMut};

#[cfg(feature = "rayon")]
pub use par::ParIter;
