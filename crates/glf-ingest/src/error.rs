use glf_store::StoreError;
use glf_types::TokenId;
use thiserror::Error;

/// Errors produced while ingesting a creation request.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Malformed, missing or out-of-order field.
    #[error("{0}")]
    InvalidInput(String),

    /// The token id is already stored or being created by another request.
    #[error("tokenId already exists: {0}")]
    Conflict(TokenId),

    #[error("store error: {0}")]
    Store(StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IngestError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Whether the store may now disagree with disk.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Store(e) if e.is_fatal())
    }
}

impl From<StoreError> for IngestError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(id) => Self::Conflict(id),
            other => Self::Store(other),
        }
    }
}

pub type IngestResult<T> = Result<T, IngestError>;
