use thiserror::Error;

#[derive(Debug, Error)]
pub enum PwnError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persist: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("could not allocate {bytes} bytes of filter memory")]
    Allocation { bytes: u64 },

    #[error("shard capacity must be a positive multiple of 8 bits, got {0}")]
    InvalidCapacity(u64),

    #[error("a shard set needs at least one shard")]
    NoShards,

    #[error("fill divisor must be positive")]
    InvalidFillDivisor,

    #[error("corpus read failed at line {line}: {source}")]
    SourceRead {
        line: u64,
        #[source]
        source: std::io::Error,
    },

    #[error("Bad magic or version")]
    BadHeader,

    #[error("Corrupt record")]
    Corrupt,

    #[error("Unsupported version {0}")]
    Unsupported(u16),
}

pub type Result<T> = std::result::Result<T, PwnError>;
