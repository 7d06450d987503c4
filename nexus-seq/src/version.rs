//! Mutation version stamps backing fail-fast detection.
//!
//! Every mutable sequence owns a [`Version`] and bumps it exactly once per
//! structural change (insert, remove, clear). Cursors and views capture the
//! value when they are created or last synchronized and compare it on every
//! access. Replacing an element in place is not a structural change.
//!
//! A version also names the sequence that issued it. Each sequence draws a
//! process-unique owner id on construction, so a cursor or view handed some
//! other sequence faults even when both counters happen to agree.
//!
//! The check is a diagnostic, not a synchronization primitive.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

use crate::{Result, SeqError};

/// Owner ids handed out so far. Zero is reserved for [`Version::UNOWNED`].
static NEXT_OWNER: AtomicU64 = AtomicU64::new(1);

/// Structural-mutation counter tagged with the issuing sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    owner: u64,
    count: u64,
}

impl Version {
    /// Version of sequences with no structure to change, such as plain
    /// slices.
    pub const UNOWNED: Self = Version { owner: 0, count: 0 };

    /// Starts a new owner at count 0.
    #[inline]
    pub fn fresh() -> Self {
        Version {
            owner: NEXT_OWNER.fetch_add(1, Ordering::Relaxed),
            count: 0,
        }
    }

    /// Returns the number of structural changes since the owner was created.
    #[inline]
    pub const fn get(self) -> u64 {
        self.count
    }

    /// Returns the id of the sequence that issued this version.
    #[inline]
    pub const fn owner(self) -> u64 {
        self.owner
    }

    /// Records one structural mutation.
    #[inline]
    pub fn bump(&mut self) {
        self.count = self.count.wrapping_add(1);
    }

    /// Compares a captured version against the live one.
    ///
    /// # Errors
    ///
    /// Returns [`SeqError::ConcurrentModification`] if the owner or the
    /// count differ.
    #[inline]
    pub fn check(self, live: Version) -> Result<()> {
        if self == live {
            Ok(())
        } else {
            tracing::debug!(
                expected_owner = self.owner,
                expected = self.count,
                found_owner = live.owner,
                found = live.count,
                "structural change detected"
            );
            Err(SeqError::ConcurrentModification {
                expected: self,
                found: live,
            })
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.count, self.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_increments_by_one() {
        let mut v = Version::fresh();
        v.bump();
        v.bump();
        assert_eq!(v.get(), 2);
    }

    #[test]
    fn check_matches() {
        let mut live = Version::fresh();
        let captured = live;
        assert!(captured.check(live).is_ok());

        live.bump();
        assert_eq!(
            captured.check(live),
            Err(SeqError::ConcurrentModification {
                expected: captured,
                found: live,
            })
        );
    }

    #[test]
    fn owners_are_distinct() {
        let a = Version::fresh();
        let b = Version::fresh();
        assert_ne!(a.owner(), b.owner());
        assert_ne!(a.owner(), Version::UNOWNED.owner());
        assert_eq!(a.get(), b.get());
        assert!(a.check(b).is_err());
    }

    #[test]
    fn display_names_count_and_owner() {
        let mut v = Version::UNOWNED;
        v.bump();
        assert_eq!(v.to_string(), "1@0");
    }
}
