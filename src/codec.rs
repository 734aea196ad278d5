use std::cmp::Ordering;

use crate::byte_order::ByteOrder;
use crate::error::TrieResult;

/// Converts elements to and from the byte keys a trie actually stores.
///
/// `encode` must be injective — two distinct elements never share a key — and
/// `decode` must invert it for any key `encode` produced. Keys read back from
/// a restored stream may predate the process, so `decode` is expected to be
/// total over arbitrary bytes, substituting where it must.
pub trait Codec {
    type Elem;

    /// Append the element's key bytes to `out`. Rejects elements the codec
    /// cannot represent.
    fn encode(&self, elem: &Self::Elem, out: &mut Vec<u8>) -> TrieResult<()>;

    /// Read an element back from its key bytes.
    fn decode(&self, bytes: &[u8]) -> Self::Elem;

    fn can_encode(&self, elem: &Self::Elem) -> bool {
        let mut scratch = Vec::new();
        self.encode(elem, &mut scratch).is_ok()
    }

    /// Compare two elements the way a trie under `order` iterates them.
    fn compare(&self, a: &Self::Elem, b: &Self::Elem, order: ByteOrder) -> Ordering {
        let mut ka = Vec::new();
        let mut kb = Vec::new();
        if self.encode(a, &mut ka).is_err() || self.encode(b, &mut kb).is_err() {
            return Ordering::Equal;
        }
        order.compare_slices(&ka, &kb)
    }
}

/// Raw byte strings, stored as themselves.
#[derive(Clone, Copy, Debug, Default)]
pub struct BytesCodec;

impl Codec for BytesCodec {
    type Elem = Vec<u8>;

    fn encode(&self, elem: &Vec<u8>, out: &mut Vec<u8>) -> TrieResult<()> {
        out.extend_from_slice(elem);
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> Vec<u8> {
        bytes.to_vec()
    }
}

/// Strings keyed by their UTF-8 bytes. Under [`ByteOrder::Unsigned`] the trie
/// then iterates in ordinary `str` order. Foreign bytes decode lossily.
#[derive(Clone, Copy, Debug, Default)]
pub struct StrCodec;

impl Codec for StrCodec {
    type Elem = String;

    fn encode(&self, elem: &String, out: &mut Vec<u8>) -> TrieResult<()> {
        out.extend_from_slice(elem.as_bytes());
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }
}

/// `u64` keyed big-endian, so [`ByteOrder::Unsigned`] iterates numerically.
#[derive(Clone, Copy, Debug, Default)]
pub struct U64Codec;

impl Codec for U64Codec {
    type Elem = u64;

    fn encode(&self, elem: &u64, out: &mut Vec<u8>) -> TrieResult<()> {
        out.extend_from_slice(&elem.to_be_bytes());
        Ok(())
    }

    fn decode(&self, bytes: &[u8]) -> u64 {
        let mut word = [0u8; 8];
        let n = bytes.len().min(8);
        word[8 - n..].copy_from_slice(&bytes[bytes.len() - n..]);
        u64::from_be_bytes(word)
    }
}

/// A codec for `T` built from a codec for `U` and a bijection `T <-> U`.
/// Grafts trie storage onto element types the library knows nothing about.
pub struct MappedCodec<C: Codec, T> {
    inner: C,
    into_inner: fn(&T) -> C::Elem,
    from_inner: fn(C::Elem) -> T,
}

impl<C: Codec + Clone, T> Clone for MappedCodec<C, T> {
    fn clone(&self) -> Self {
        MappedCodec {
            inner: self.inner.clone(),
            into_inner: self.into_inner,
            from_inner: self.from_inner,
        }
    }
}

impl<C: Codec, T> MappedCodec<C, T> {
    pub fn new(inner: C, into_inner: fn(&T) -> C::Elem, from_inner: fn(C::Elem) -> T) -> Self {
        MappedCodec {
            inner,
            into_inner,
            from_inner,
        }
    }
}

impl<C: Codec, T> Codec for MappedCodec<C, T> {
    type Elem = T;

    fn encode(&self, elem: &T, out: &mut Vec<u8>) -> TrieResult<()> {
        self.inner.encode(&(self.into_inner)(elem), out)
    }

    fn decode(&self, bytes: &[u8]) -> T {
        (self.from_inner)(self.inner.decode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_str_round_trip() {
        let codec = StrCodec;
        let mut key = Vec::new();
        codec.encode(&"Moon".to_string(), &mut key).unwrap();
        assert_eq!(key, b"Moon");
        assert_eq!(codec.decode(&key), "Moon");
    }

    #[test]
    fn test_u64_orders_numerically() {
        let codec = U64Codec;
        let mut small = Vec::new();
        let mut big = Vec::new();
        codec.encode(&300, &mut small).unwrap();
        codec.encode(&70_000, &mut big).unwrap();
        assert_eq!(
            ByteOrder::Unsigned.compare_slices(&small, &big),
            Ordering::Less
        );
        assert_eq!(codec.decode(&small), 300);
    }

    #[test]
    fn test_compare_matches_iteration_order() {
        let codec = StrCodec;
        assert_eq!(
            codec.compare(&"Moo".into(), &"Moon".into(), ByteOrder::Unsigned),
            Ordering::Less
        );
        assert_eq!(
            codec.compare(&"Ape".into(), &"Apple".into(), ByteOrder::ReverseUnsigned),
            Ordering::Greater
        );
    }

    #[test]
    fn test_mapped_codec_round_trip() {
        #[derive(Debug, PartialEq)]
        struct Id(u64);
        let codec = MappedCodec::new(U64Codec, |id: &Id| id.0, Id);
        let mut key = Vec::new();
        codec.encode(&Id(42), &mut key).unwrap();
        assert_eq!(codec.decode(&key), Id(42));
    }
}
