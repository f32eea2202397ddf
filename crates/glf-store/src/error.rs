use std::path::PathBuf;

use glf_types::TokenId;

/// Errors from token store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with this id is already stored.
    #[error("tokenId already exists: {0}")]
    Conflict(TokenId),

    /// The data file exists but does not hold a valid record collection.
    #[error("corrupt data file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    /// Writing or replacing the data file failed.
    #[error("failed to persist {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization of the collection failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An earlier persist failed; in-memory and durable state may disagree.
    #[error("store is in a failed state after an earlier persist error")]
    Failed,

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl StoreError {
    /// Whether the error leaves the store unable to keep serving safely.
    ///
    /// Everything except a duplicate id is a storage failure.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Conflict(_))
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
