//! One Bloom filter shard: a bit field plus an insertion counter.
use crate::bitfield::BitField;
use crate::errors::{PwnError, Result};
use crate::hash::HashTriple;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterShard {
    bits: BitField,
    inserted_count: u64,
    fill_divisor: u64,
}

/// Point-in-time summary of a shard, reported by `info` and the lookup service.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ShardStats {
    pub capacity_bits: u64,
    pub inserted: u64,
    pub bits_set: u64,
    pub full: bool,
    pub estimated_fpp: f64,
}

impl FilterShard {
    pub fn create(capacity_bits: u64, fill_divisor: u64) -> Result<Self> {
        if fill_divisor == 0 { return Err(PwnError::InvalidFillDivisor); }
        Ok(Self { bits: BitField::create(capacity_bits)?, inserted_count: 0, fill_divisor })
    }

    /// Reassemble a shard read back from a snapshot.
    pub fn from_parts(bits: BitField, inserted_count: u64, fill_divisor: u64) -> Result<Self> {
        if fill_divisor == 0 { return Err(PwnError::InvalidFillDivisor); }
        Ok(Self { bits, inserted_count, fill_divisor })
    }

    pub fn insert(&mut self, key: &[u8]) {
        for i in HashTriple::indices(key, &self.bits) {
            self.bits.set_bit(i);
        }
        self.inserted_count += 1;
    }

    pub fn contains(&self, key: &[u8]) -> bool {
        HashTriple::indices(key, &self.bits)
            .iter()
            .all(|&i| self.bits.get_bit(i))
    }

    /// Heuristic: each insertion is budgeted `fill_divisor` bits of headroom.
    pub fn is_full(&self) -> bool {
        self.inserted_count >= self.threshold()
    }

    pub fn threshold(&self) -> u64 { self.bits.capacity_bits() / self.fill_divisor }

    pub fn inserted_count(&self) -> u64 { self.inserted_count }
    pub fn capacity_bits(&self) -> u64 { self.bits.capacity_bits() }
    pub fn fill_divisor(&self) -> u64 { self.fill_divisor }
    pub fn bits(&self) -> &BitField { &self.bits }

    /// False-positive probability implied by the current fill: `(set / m)^3`.
    pub fn estimated_fpp(&self) -> f64 {
        let fill = self.bits.count_ones() as f64 / self.bits.capacity_bits() as f64;
        fill.powi(3)
    }

    pub fn stats(&self) -> ShardStats {
        ShardStats {
            capacity_bits: self.capacity_bits(),
            inserted: self.inserted_count,
            bits_set: self.bits.count_ones(),
            full: self.is_full(),
            estimated_fpp: self.estimated_fpp(),
        }
    }
}
