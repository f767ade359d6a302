//! Three seeded XXH32 positions per key.
use crate::bitfield::{BitField, BitIndex};
use crate::consts::HASH_SEEDS;
use xxhash_rust::xxh32::xxh32;

pub struct HashTriple;

impl HashTriple {
    /// Bit positions for `key` in a field of `capacity_bits` bits. The three
    /// positions need not be distinct.
    #[inline]
    pub fn derive(key: &[u8], capacity_bits: u64) -> [u64; 3] {
        HASH_SEEDS.map(|seed| u64::from(xxh32(key, seed)) % capacity_bits)
    }

    /// The same three positions as checked indices into `field`.
    #[inline]
    pub fn indices(key: &[u8], field: &BitField) -> [BitIndex; 3] {
        HASH_SEEDS.map(|seed| field.index(xxh32(key, seed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reproducible_for_same_key_and_capacity() {
        let a = HashTriple::derive(b"00000ABCDE", 8 * 1024);
        let b = HashTriple::derive(b"00000ABCDE", 8 * 1024);
        assert_eq!(a, b);
        for i in a {
            assert!(i < 8 * 1024);
        }
    }

    #[test]
    fn seeds_are_0_1_2() {
        let cap = 1u64 << 32;
        let t = HashTriple::derive(b"1234567890", cap);
        assert_eq!(t[0], u64::from(xxh32(b"1234567890", 0)));
        assert_eq!(t[1], u64::from(xxh32(b"1234567890", 1)));
        assert_eq!(t[2], u64::from(xxh32(b"1234567890", 2)));
    }

    #[test]
    fn indices_agree_with_derive() {
        let field = BitField::create(4096).unwrap();
        let raw = HashTriple::derive(b"00000ABCDE", 4096);
        let idx = HashTriple::indices(b"00000ABCDE", &field);
        assert_eq!(idx.map(|i| i.get()), raw);
    }

    #[test]
    fn empty_key_is_deterministic() {
        assert_eq!(HashTriple::derive(b"", 64), HashTriple::derive(b"", 64));
        // known XXH32 vector for empty input, seed 0
        assert_eq!(xxh32(b"", 0), 0x02CC_5D05);
    }
}
