// crates/pwn_core/src/consts.rs

/// Bits per shard unless configured otherwise: 8 Mb, i.e. 1 MiB of bit array.
pub const DEFAULT_SHARD_BITS: u64 = 8 * 1024 * 1024;

/// `is_full` trips once `inserted_count >= capacity_bits / DEFAULT_FILL_DIVISOR`.
pub const DEFAULT_FILL_DIVISOR: u64 = 8;

/// Width of the hash-prefix token taken from each corpus line (5 bytes, hex).
pub const KEY_LEN: usize = 10;

/// XXH32 seeds for the three bit positions. Changing them invalidates every
/// filter already written to disk.
pub const HASH_SEEDS: [u32; 3] = [0, 1, 2];

pub const MAGIC_SNAP: &[u8; 4] = b"PWNF";
pub const VERSION: u16 = 1;

// magic(4) + version(2) + rsv(2) + shard_count(4) + active_index(4) + fill_divisor(8)
pub const HDR_SIZE: usize = 24;
// capacity_bits(8) + inserted_count(8) + byte_len(8)
pub const SHARD_HDR_SIZE: usize = 24;
