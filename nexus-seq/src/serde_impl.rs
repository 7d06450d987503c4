//! Serde support: both sequences serialize as a plain serde sequence.
//!
//! Only the elements travel. Capacity and version are local state: a
//! deserialized sequence is a new owner at version 0, like a clone.

use core::fmt;
use core::marker::PhantomData;

use serde::de::{self, Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};

use crate::{ArraySequence, Key, LinkedSequence};

/// Upper bound on trusting a size hint from the wire.
const MAX_PREALLOC: usize = 4096;

impl<T: Serialize> Serialize for ArraySequence<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<T: Serialize, K: Key> Serialize for LinkedSequence<T, K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

struct ArrayVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for ArrayVisitor<T> {
    type Value = ArraySequence<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let hint = access.size_hint().unwrap_or(0).min(MAX_PREALLOC);
        let mut seq = ArraySequence::try_with_capacity(hint).map_err(de::Error::custom)?;
        while let Some(value) = access.next_element()? {
            seq.try_push(value).map_err(de::Error::custom)?;
        }
        seq.reset_version();
        Ok(seq)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ArraySequence<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(ArrayVisitor(PhantomData))
    }
}

struct LinkedVisitor<T, K>(PhantomData<(T, K)>);

impl<'de, T: Deserialize<'de>, K: Key> Visitor<'de> for LinkedVisitor<T, K> {
    type Value = LinkedSequence<T, K>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a sequence")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let hint = access.size_hint().unwrap_or(0).min(MAX_PREALLOC);
        let mut seq = LinkedSequence::with_capacity(hint);
        while let Some(value) = access.next_element()? {
            seq.try_push_back(value).map_err(de::Error::custom)?;
        }
        seq.reset_version();
        Ok(seq)
    }
}

impl<'de, T: Deserialize<'de>, K: Key> Deserialize<'de> for LinkedSequence<T, K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(LinkedVisitor(PhantomData))
    }
}

#[cfg(test)]
mod tests {
    use crate::{ArraySequence, LinkedSequence};

    #[test]
    fn wire_format_is_a_plain_sequence() {
        let array: ArraySequence<u8> = [1, 2, 3].into_iter().collect();
        let linked: LinkedSequence<u8> = [1, 2, 3].into_iter().collect();

        let from_array = postcard::to_allocvec(&array).unwrap();
        let from_linked = postcard::to_allocvec(&linked).unwrap();
        let from_vec = postcard::to_allocvec(&vec![1u8, 2, 3]).unwrap();

        assert_eq!(from_array, vec![3, 1, 2, 3]);
        assert_eq!(from_linked, from_vec);
    }

    #[test]
    fn round_trip_resets_version() {
        let mut array: ArraySequence<u32> = (0..50).collect();
        array.remove_at(0).unwrap();
        let bytes = postcard::to_allocvec(&array).unwrap();

        let decoded: ArraySequence<u32> = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(decoded, array);
        assert_eq!(decoded.version().get(), 0);

        let linked: LinkedSequence<u32> = postcard::from_bytes(&bytes).unwrap();
        assert_eq!(linked.to_vec(), array.to_vec());
        assert_eq!(linked.version().get(), 0);
    }

    #[test]
    fn decoded_sequences_accept_fresh_cursors() {
        use crate::{SeqCursor, Sequence};

        let bytes = postcard::to_allocvec(&vec![5u32, 6, 7]).unwrap();
        let mut array: ArraySequence<u32> = postcard::from_bytes(&bytes).unwrap();
        let mut linked: LinkedSequence<u32> = postcard::from_bytes(&bytes).unwrap();
        assert_ne!(array.version().owner(), linked.version().owner());

        let mut cursor = array.cursor_at(0).unwrap();
        assert_eq!(cursor.next(&array), Ok(&5));
        array.push(8);
        assert!(cursor.next(&array).is_err());

        let mut cursor = linked.cursor_at(3).unwrap();
        assert_eq!(cursor.previous(&linked), Ok(&7));
        linked.push_back(8);
        assert!(cursor.previous(&linked).is_err());
    }

    #[test]
    fn key_exhaustion_surfaces_as_error() {
        let values: Vec<u8> = vec![0; 70_000];
        let bytes = postcard::to_allocvec(&values).unwrap();
        let err = postcard::from_bytes::<LinkedSequence<u8, u16>>(&bytes).unwrap_err();
        assert_eq!(err, postcard::Error::SerdeDeCustom);

        assert!(postcard::from_bytes::<LinkedSequence<u8, u32>>(&bytes).is_ok());
    }
}
