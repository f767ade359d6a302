//! Ordered collection of filter shards with an overflow cursor.
use crate::consts::{DEFAULT_FILL_DIVISOR, DEFAULT_SHARD_BITS};
use crate::errors::{PwnError, Result};
use crate::shard::{FilterShard, ShardStats};
use tracing::debug;

/// Construction-time knobs for a [`ShardSet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShardConfig {
    /// Bits per shard; positive multiple of 8.
    pub shard_bits: u64,
    /// A shard reports full after `shard_bits / fill_divisor` insertions.
    pub fill_divisor: u64,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self { shard_bits: DEFAULT_SHARD_BITS, fill_divisor: DEFAULT_FILL_DIVISOR }
    }
}

impl ShardConfig {
    pub fn with_shard_bits(mut self, bits: u64) -> Self { self.shard_bits = bits; self }
    pub fn with_fill_divisor(mut self, d: u64) -> Self { self.fill_divisor = d; self }

    pub fn validate(&self) -> Result<()> {
        if self.shard_bits == 0 || self.shard_bits % 8 != 0 {
            return Err(PwnError::InvalidCapacity(self.shard_bits));
        }
        if self.fill_divisor == 0 { return Err(PwnError::InvalidFillDivisor); }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShardSet {
    shards: Vec<FilterShard>,
    active_index: usize,
}

impl ShardSet {
    /// `ceil(corpus_len / shard_bits)`, never less than one.
    ///
    /// Proportional estimate only: it compares corpus bytes with shard bits,
    /// so corpora of short lines end up overprovisioned.
    pub fn size_for(corpus_len: u64, shard_bits: u64) -> usize {
        let n = corpus_len.div_ceil(shard_bits.max(1)).max(1);
        usize::try_from(n).unwrap_or(usize::MAX)
    }

    /// Allocate `shard_count` empty shards. Nothing is returned unless every
    /// shard could be allocated.
    pub fn create(shard_count: usize, config: &ShardConfig) -> Result<Self> {
        config.validate()?;
        if shard_count == 0 { return Err(PwnError::NoShards); }
        let mut shards = Vec::new();
        shards.try_reserve_exact(shard_count).map_err(|_| PwnError::Allocation {
            bytes: (shard_count as u64).saturating_mul(config.shard_bits / 8),
        })?;
        for _ in 0..shard_count {
            shards.push(FilterShard::create(config.shard_bits, config.fill_divisor)?);
        }
        debug!(shard_count, shard_bits = config.shard_bits, "allocated shard set");
        Ok(Self { shards, active_index: 0 })
    }

    /// Size from the corpus length and allocate in one step.
    pub fn for_corpus(corpus_len: u64, config: &ShardConfig) -> Result<Self> {
        config.validate()?;
        Self::create(Self::size_for(corpus_len, config.shard_bits), config)
    }

    /// Reassemble a set read back from a snapshot.
    pub fn from_parts(shards: Vec<FilterShard>, active_index: usize) -> Result<Self> {
        if shards.is_empty() { return Err(PwnError::NoShards); }
        if active_index >= shards.len() { return Err(PwnError::Corrupt); }
        Ok(Self { shards, active_index })
    }

    /// Insert into the active shard, then move the cursor on if that shard is full.
    /// Returns true when the cursor advanced.
    pub fn route_insert(&mut self, key: &[u8]) -> bool {
        let shard = &mut self.shards[self.active_index];
        shard.insert(key);
        if !shard.is_full() {
            return false;
        }
        let from = self.active_index;
        self.active_index = (self.active_index + 1) % self.shards.len();
        debug!(from, to = self.active_index, "shard full, rotating");
        true
    }

    /// A key may live in any shard, so every shard is asked.
    pub fn contains(&self, key: &[u8]) -> bool {
        self.shards.iter().any(|s| s.contains(key))
    }

    pub fn shards(&self) -> &[FilterShard] { &self.shards }
    pub fn len(&self) -> usize { self.shards.len() }
    /// Always false: a set holds at least one shard.
    pub fn is_empty(&self) -> bool { self.shards.is_empty() }
    pub fn active_index(&self) -> usize { self.active_index }

    pub fn total_inserted(&self) -> u64 {
        self.shards.iter().map(|s| s.inserted_count()).sum()
    }

    /// Every shard has crossed its fullness threshold.
    pub fn saturated(&self) -> bool {
        self.shards.iter().all(|s| s.is_full())
    }

    pub fn stats(&self) -> Vec<ShardStats> {
        self.shards.iter().map(|s| s.stats()).collect()
    }
}
