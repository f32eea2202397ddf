use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use glf_ingest::IngestError;
use glf_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("invalid multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("service unavailable after a storage failure")]
    Unavailable,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// HTTP status for this error.
    ///
    /// Caller mistakes (bad input, duplicate or unknown ids) are all 422.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidInput(_) | Self::NotFound(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Ingest(IngestError::InvalidInput(_) | IngestError::Conflict(_)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::Store(StoreError::Conflict(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Multipart(e) => e.status(),
            Self::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the store may now disagree with disk.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Store(e) => e.is_fatal(),
            Self::Ingest(e) => e.is_fatal(),
            _ => false,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "Internal server error".to_string()
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "request rejected");
            self.to_string()
        };
        (status, body).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;
    use glf_types::TokenId;

    #[test]
    fn caller_errors_are_422() {
        assert_eq!(ServerError::InvalidInput("x".into()).status(), 422);
        assert_eq!(ServerError::NotFound("x".into()).status(), 422);
        assert_eq!(ServerError::from(IngestError::Conflict(TokenId::new(1))).status(), 422);
        assert_eq!(ServerError::from(StoreError::Conflict(TokenId::new(1))).status(), 422);
    }

    #[test]
    fn storage_errors_are_500_and_fatal() {
        let e = ServerError::from(StoreError::Failed);
        assert_eq!(e.status(), 500);
        assert!(e.is_fatal());
        let e = ServerError::from(IngestError::Store(StoreError::Failed));
        assert!(e.is_fatal());
        assert!(!ServerError::Internal("x".into()).is_fatal());
    }

    #[test]
    fn conflict_message_is_passed_through() {
        let e = ServerError::from(IngestError::Conflict(TokenId::new(8)));
        assert_eq!(e.to_string(), "tokenId already exists: 8");
    }
}
