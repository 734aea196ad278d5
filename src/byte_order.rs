use std::cmp::Ordering;

/// A total order over bytes. Every trie fixes one order at creation; sibling
/// lists, iteration and rank queries all follow it. The order must stay stable
/// for the lifetime of the trie.
///
/// The four canonical variants compare by identity; `Custom` compares by
/// fn-pointer identity, so two tries share an order only when they share the
/// comparator function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ByteOrder {
    /// Bytes as `u8`, smallest first.
    Unsigned,
    /// Bytes as `i8`, smallest first.
    Signed,
    /// Bytes as `u8`, largest first.
    ReverseUnsigned,
    /// Bytes as `i8`, largest first.
    ReverseSigned,
    /// A user-supplied comparator. Must be a total order.
    Custom(fn(u8, u8) -> Ordering),
}

impl ByteOrder {
    #[inline]
    pub fn compare(&self, a: u8, b: u8) -> Ordering {
        match self {
            ByteOrder::Unsigned => a.cmp(&b),
            ByteOrder::Signed => (a as i8).cmp(&(b as i8)),
            ByteOrder::ReverseUnsigned => b.cmp(&a),
            ByteOrder::ReverseSigned => (b as i8).cmp(&(a as i8)),
            ByteOrder::Custom(f) => f(a, b),
        }
    }

    /// Lexicographic extension of the byte order to whole keys. A strict
    /// prefix sorts before its extensions. This is the order tries iterate in.
    pub fn compare_slices(&self, a: &[u8], b: &[u8]) -> Ordering {
        for (x, y) in a.iter().zip(b.iter()) {
            match self.compare(*x, *y) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        a.len().cmp(&b.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ByteOrder::Unsigned, 0x00, 0xff, Ordering::Less)]
    #[case(ByteOrder::Unsigned, 0x41, 0x41, Ordering::Equal)]
    #[case(ByteOrder::Signed, 0xff, 0x00, Ordering::Less)]
    #[case(ByteOrder::Signed, 0x7f, 0x80, Ordering::Greater)]
    #[case(ByteOrder::ReverseUnsigned, 0x00, 0xff, Ordering::Greater)]
    #[case(ByteOrder::ReverseSigned, 0xff, 0x00, Ordering::Greater)]
    fn test_compare(
        #[case] order: ByteOrder,
        #[case] a: u8,
        #[case] b: u8,
        #[case] expect: Ordering,
    ) {
        assert_eq!(order.compare(a, b), expect);
    }

    #[test]
    fn test_total_order() {
        for order in [
            ByteOrder::Unsigned,
            ByteOrder::Signed,
            ByteOrder::ReverseUnsigned,
            ByteOrder::ReverseSigned,
        ] {
            for a in 0..=255u8 {
                assert_eq!(order.compare(a, a), Ordering::Equal);
                for b in 0..=255u8 {
                    assert_eq!(order.compare(a, b), order.compare(b, a).reverse());
                }
            }
        }
    }

    #[test]
    fn test_compare_slices_prefix_first() {
        let order = ByteOrder::Unsigned;
        assert_eq!(order.compare_slices(b"Moo", b"Moon"), Ordering::Less);
        assert_eq!(order.compare_slices(b"Moody", b"Moon"), Ordering::Less);
        assert_eq!(order.compare_slices(b"Moon", b"Moon"), Ordering::Equal);
    }

    #[test]
    fn test_custom_identity() {
        fn flip(a: u8, b: u8) -> Ordering {
            b.cmp(&a)
        }
        assert_eq!(ByteOrder::Custom(flip), ByteOrder::Custom(flip));
        assert_ne!(ByteOrder::Custom(flip), ByteOrder::Unsigned);
        assert_eq!(ByteOrder::Custom(flip).compare(1, 2), Ordering::Greater);
    }
}
