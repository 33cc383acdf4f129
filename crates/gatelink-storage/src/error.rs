use thiserror::Error;

/// Storage-specific error types.
///
/// These cover the raw store only. Out-of-range *values* are not errors:
/// the config layer silently substitutes documented defaults for them.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Read or write beyond the store's capacity.
    #[error("address {addr} out of range (capacity {capacity})")]
    AddressOutOfRange { addr: usize, capacity: usize },

    /// The durable commit after a write failed.
    #[error("commit failed: {0}")]
    CommitFailed(String),

    /// Field index outside its table (serial-number byte, ticket line).
    #[error("invalid field index {0}")]
    InvalidIndex(usize),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Specialized result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
