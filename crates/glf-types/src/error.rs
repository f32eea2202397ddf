use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid token id: {0:?}")]
    InvalidTokenId(String),

    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
