use std::path::PathBuf;

/// Errors from ledger store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The durable document exists but cannot be decoded.
    #[error("corrupt ledger document {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// The in-memory ledger could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A lock guarding in-memory state was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    LockPoisoned,

    /// Storage backend is read-only or otherwise unavailable.
    #[error("store is read-only")]
    ReadOnly,
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
