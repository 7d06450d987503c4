//! Error types for sequence, cursor and view operations.
//!
//! Every fault is local and synchronous. Nothing in this crate retries.

use thiserror::Error;

use crate::Version;

/// Result alias used throughout the crate.
pub type Result<T, E = SeqError> = core::result::Result<T, E>;

/// Errors returned by sequences, cursors and views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SeqError {
    /// Index outside the valid bound for the requested operation.
    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// Length of the sequence (or view) at the time of the call.
        len: usize,
    },

    /// A range whose start lies after its end.
    #[error("illegal range: from {from} > to {to}")]
    IllegalRange {
        /// Range start.
        from: usize,
        /// Range end (exclusive).
        to: usize,
    },

    /// A cursor or view observed a structural change it did not make.
    #[error("concurrent structural change: expected version {expected}, found {found}")]
    ConcurrentModification {
        /// Version captured by the cursor or view.
        expected: Version,
        /// Live version of the backing sequence.
        found: Version,
    },

    /// The sequence does not implement this mutator.
    #[error("unsupported mutation: {op}")]
    UnsupportedMutation {
        /// Name of the rejected operation.
        op: &'static str,
    },

    /// A must-succeed accessor was called on an empty sequence, or a cursor
    /// was advanced past its end.
    #[error("no such element")]
    NoSuchElement,

    /// Positional cursor mutation without a current element.
    #[error("cursor has no element to operate on")]
    IllegalCursorState,

    /// Required capacity exceeds what the platform (or key type) can address.
    #[error("requested capacity {requested} exceeds maximum {max}")]
    AllocationTooLarge {
        /// Capacity that was asked for.
        requested: usize,
        /// Largest capacity that can be honoured.
        max: usize,
    },
}

/// Checks `index < len` (element access).
#[inline]
pub(crate) fn check_element_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(SeqError::IndexOutOfRange { index, len })
    }
}

/// Checks `index <= len` (insertion point).
#[inline]
pub(crate) fn check_position_index(index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(SeqError::IndexOutOfRange { index, len })
    }
}

/// Checks `from <= to <= len`.
#[inline]
pub(crate) fn check_range(from: usize, to: usize, len: usize) -> Result<()> {
    if to > len {
        return Err(SeqError::IndexOutOfRange { index: to, len });
    }
    if from > to {
        return Err(SeqError::IllegalRange { from, to });
    }
    Ok(())
}
