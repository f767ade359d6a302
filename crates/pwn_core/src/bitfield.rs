//! Fixed-capacity bit array backing one filter shard.
use crate::errors::{PwnError, Result};

/// A bit position already reduced into `0..capacity_bits`.
///
/// Obtained from [`BitField::index`], so every index a field is asked about
/// was reduced against that field's own capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BitIndex(u64);

impl BitIndex {
    #[inline]
    pub(crate) fn reduce(hash: u32, capacity_bits: u64) -> Self {
        debug_assert!(capacity_bits > 0);
        Self(u64::from(hash) % capacity_bits)
    }

    #[inline]
    pub fn get(self) -> u64 { self.0 }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitField {
    capacity_bits: u64,
    bytes: Vec<u8>,
}

impl BitField {
    /// Zeroed field of `capacity_bits` bits. Capacity must be a positive multiple of 8.
    pub fn create(capacity_bits: u64) -> Result<Self> {
        if capacity_bits == 0 || capacity_bits % 8 != 0 {
            return Err(PwnError::InvalidCapacity(capacity_bits));
        }
        let byte_len = capacity_bits / 8;
        let len = usize::try_from(byte_len).map_err(|_| PwnError::Allocation { bytes: byte_len })?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(len)
            .map_err(|_| PwnError::Allocation { bytes: byte_len })?;
        bytes.resize(len, 0);
        Ok(Self { capacity_bits, bytes })
    }

    /// Rebuild from a persisted buffer; the length must match the capacity exactly.
    pub fn from_bytes(capacity_bits: u64, bytes: Vec<u8>) -> Result<Self> {
        if capacity_bits == 0 || capacity_bits % 8 != 0 {
            return Err(PwnError::InvalidCapacity(capacity_bits));
        }
        if bytes.len() as u64 != capacity_bits / 8 {
            return Err(PwnError::Corrupt);
        }
        Ok(Self { capacity_bits, bytes })
    }

    #[inline]
    pub fn capacity_bits(&self) -> u64 { self.capacity_bits }

    /// `hash % capacity_bits` as an index into this field.
    #[inline]
    pub fn index(&self, hash: u32) -> BitIndex {
        BitIndex::reduce(hash, self.capacity_bits)
    }

    #[inline]
    pub fn set_bit(&mut self, index: BitIndex) {
        let (byte, mask) = self.locate(index);
        self.bytes[byte] |= mask;
    }

    #[inline]
    pub fn get_bit(&self, index: BitIndex) -> bool {
        let (byte, mask) = self.locate(index);
        self.bytes[byte] & mask != 0
    }

    #[inline]
    fn locate(&self, index: BitIndex) -> (usize, u8) {
        let bit = index.get();
        debug_assert!(bit < self.capacity_bits, "bit {bit} outside field of {}", self.capacity_bits);
        ((bit / 8) as usize, 1u8 << (bit & 7))
    }

    pub fn count_ones(&self) -> u64 {
        self.bytes.iter().map(|b| u64::from(b.count_ones())).sum()
    }

    pub fn as_bytes(&self) -> &[u8] { &self.bytes }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_capacity() {
        assert!(matches!(BitField::create(0), Err(PwnError::InvalidCapacity(0))));
        assert!(matches!(BitField::create(12), Err(PwnError::InvalidCapacity(12))));
    }

    #[test]
    fn starts_zeroed_and_sets_idempotently() {
        let mut f = BitField::create(64).unwrap();
        assert_eq!(f.as_bytes().len(), 8);
        assert_eq!(f.count_ones(), 0);

        let i = f.index(67); // 67 % 64 == 3
        assert_eq!(i.get(), 3);
        assert!(!f.get_bit(i));
        f.set_bit(i);
        f.set_bit(i);
        assert!(f.get_bit(i));
        assert_eq!(f.count_ones(), 1);
        assert_eq!(f.as_bytes()[0], 0b0000_1000);
    }

    #[test]
    fn last_bit_is_addressable() {
        let mut f = BitField::create(16).unwrap();
        let last = f.index(15);
        f.set_bit(last);
        assert!(f.get_bit(last));
        assert_eq!(f.as_bytes(), &[0x00, 0x80]);
    }

    #[test]
    fn field_indices_stay_in_range() {
        let mut f = BitField::create(64).unwrap();
        for h in [0u32, 63, 64, 1000, u32::MAX] {
            let i = f.index(h);
            assert!(i.get() < 64);
            f.set_bit(i);
            assert!(f.get_bit(i));
        }
        assert_eq!(f.index(1000).get(), 1000 % 64);
    }

    #[test]
    fn from_bytes_checks_length() {
        assert!(matches!(BitField::from_bytes(16, vec![0u8; 3]), Err(PwnError::Corrupt)));
        let f = BitField::from_bytes(16, vec![0x01, 0x00]).unwrap();
        assert!(f.get_bit(f.index(0)));
    }
}
