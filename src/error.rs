//! Error types for erasure-coding operations

use thiserror::Error;

/// Stable classification of failures, independent of the concrete error.
///
/// Every [`ErasureError`] maps to exactly one kind via
/// [`ErasureError::kind`]; success is simply `Ok`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// An allocation needed to build a matrix or buffer failed
    OutOfMemory = 1,
    /// A parameter violates the documented preconditions
    InvalidArgument = 2,
    /// Field arithmetic hit an impossible state (singular system,
    /// division by zero); indicates a caller-side shard-map bug
    DomainError = 3,
    /// Unclassified internal failure
    Internal = 4,
}

/// Errors that can occur during erasure-coding operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ErasureError {
    /// Shard geometry outside the supported range
    #[error("unsupported shard geometry: {data} data + {parity} parity (need at least 2 of each, at most 256 total)")]
    ShardCountOutOfRange { data: usize, parity: usize },

    /// Stripe buffer shorter than the declared geometry requires
    #[error("stripe buffer holds {actual} bytes but the shard layout needs {expected}")]
    StripeTooSmall { expected: usize, actual: usize },

    /// Bytes to process exceed the per-shard stride
    #[error("work length {work_len} exceeds the shard stride {stride}")]
    WorkLengthExceedsStride { work_len: usize, stride: usize },

    /// Shard map does not cover every slot of the stripe
    #[error("shard map has {actual} entries but the stripe has {expected} slots")]
    ShardMapLength { expected: usize, actual: usize },

    /// Shard index outside the stripe
    #[error("shard index {shard} out of range for a stripe of {total} shards")]
    ShardIndexOutOfRange { shard: usize, total: usize },

    /// Reconstruction target is a parity shard
    #[error("slot {slot} asks to reconstruct shard {shard}, which is parity; only data shards are recoverable")]
    RecoverParityShard { slot: usize, shard: usize },

    /// More reconstruction targets than parity shards
    #[error("asked to reconstruct {requested} shards but only {parity} parity shards exist")]
    TooManyRecoverTargets { requested: usize, parity: usize },

    /// Too few surviving shards to reconstruct anything
    #[error("only {good} shards survive but {needed} sources are required")]
    NotEnoughShards { good: usize, needed: usize },

    /// Division by zero in GF(2^8)
    #[error("division by zero in GF(2^8)")]
    DivisionByZero,

    /// Gauss-Jordan found no usable pivot
    #[error("matrix is singular; the chosen source rows are not independent")]
    SingularMatrix,

    /// Inverse requested for a non-square system
    #[error("cannot invert a {rows}x{cols} system")]
    NonSquareInverse { rows: usize, cols: usize },

    /// Allocation failure
    #[error("allocation of {bytes} bytes failed")]
    OutOfMemory { bytes: usize },
}

impl ErasureError {
    /// The stable kind this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErasureError::OutOfMemory { .. } => ErrorKind::OutOfMemory,
            ErasureError::DivisionByZero | ErasureError::SingularMatrix => ErrorKind::DomainError,
            ErasureError::NonSquareInverse { .. } => ErrorKind::Internal,
            ErasureError::ShardCountOutOfRange { .. }
            | ErasureError::StripeTooSmall { .. }
            | ErasureError::WorkLengthExceedsStride { .. }
            | ErasureError::ShardMapLength { .. }
            | ErasureError::ShardIndexOutOfRange { .. }
            | ErasureError::RecoverParityShard { .. }
            | ErasureError::TooManyRecoverTargets { .. }
            | ErasureError::NotEnoughShards { .. } => ErrorKind::InvalidArgument,
        }
    }
}

/// Type alias for Result with ErasureError
pub type Result<T> = std::result::Result<T, ErasureError>;
