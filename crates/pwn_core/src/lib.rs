pub mod consts;
pub mod errors;
pub mod utils;
pub mod bitfield;
pub mod hash;
pub mod shard;
pub mod shard_set;
pub mod ingest;
pub mod snapshot;

pub use bitfield::{BitField, BitIndex};
pub use errors::{PwnError, Result};
pub use hash::HashTriple;
pub use ingest::{build, build_from_path, extract_key, query_key, IngestPipeline, IngestReport, Key};
pub use shard::{FilterShard, ShardStats};
pub use shard_set::{ShardConfig, ShardSet};
