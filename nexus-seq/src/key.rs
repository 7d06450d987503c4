//! Node link keys for [`LinkedSequence`](crate::LinkedSequence).
//!
//! Nodes live in a slab arena and point at their neighbours by slot. A key
//! is that slot squeezed into an integer type of the caller's choosing, with
//! one value given up as the null link ([`Key::NONE`]). That value is also
//! the first slot the type cannot name, so the key width caps the length:
//!
//! ```text
//! key    NONE            longest sequence
//! u16    65_535          65_535 elements
//! u32    4_294_967_295   4_294_967_295 elements
//! ```
//!
//! Narrow keys make every node two links smaller. Running out of slots is an
//! ordinary error from the inserting call, not a panic.
//!
//! ```
//! use nexus_seq::{Key, LinkedSequence};
//!
//! assert_eq!(u16::max_len(), 65_535);
//! assert_eq!(u16::try_from_slot(65_534), Some(65_534));
//! assert_eq!(u16::try_from_slot(65_535), None);
//!
//! let small: LinkedSequence<u8, u16> = (0..10).collect();
//! assert_eq!(small.len(), 10);
//! ```

/// Integer type naming an arena slot, with a reserved null value.
pub trait Key: Copy + Eq {
    /// The null link. Never names a live node.
    const NONE: Self;

    /// Key for arena slot `slot`, or `None` if `slot` is at or past
    /// [`NONE`](Self::NONE).
    fn try_from_slot(slot: usize) -> Option<Self>;

    /// Arena slot this key names.
    fn slot(self) -> usize;

    /// Returns `true` for the null link.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` for a link to a node.
    #[inline]
    fn is_some(self) -> bool {
        self != Self::NONE
    }

    /// Most nodes a sequence keyed by `Self` can hold.
    #[inline]
    fn max_len() -> usize {
        Self::NONE.slot()
    }
}

macro_rules! slot_key {
    ($($ty:ty),*) => {$(
        impl Key for $ty {
            const NONE: Self = <$ty>::MAX;

            #[inline]
            fn try_from_slot(slot: usize) -> Option<Self> {
                <$ty>::try_from(slot).ok().filter(|key| *key != Self::NONE)
            }

            #[inline]
            fn slot(self) -> usize {
                self as usize
            }
        }
    )*};
}

slot_key!(u16, u32, u64, usize);
