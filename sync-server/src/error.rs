//! Error types for the sync server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Storage layer errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Blob exceeds the configured limit.
    #[error("blob too large: {size} bytes (limit: {limit} bytes)")]
    TooLarge {
        /// Actual size of the blob.
        size: usize,
        /// Maximum allowed size.
        limit: usize,
    },
}

/// HTTP-facing errors, one variant per status the API can return.
///
/// Plain-text bodies; the structured detail lives in the logs. Storage
/// failures are logged at the boundary and surface as an opaque 500.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The id in the path is not a well-formed identifier.
    #[error("invalid id")]
    InvalidId,

    /// No blob is stored under this id.
    #[error("not found")]
    NotFound,

    /// The request body exceeds the configured limit.
    #[error("body too large")]
    PayloadTooLarge,

    /// A write for this id was accepted too recently.
    #[error("rate limited")]
    RateLimited,

    /// The storage layer failed.
    #[error("storage error: {0}")]
    Storage(StorageError),
}

impl From<StorageError> for ApiError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::TooLarge { .. } => Self::PayloadTooLarge,
            other => Self::Storage(other),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::PayloadTooLarge => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Storage(e) = &self {
            tracing::error!(error = %e, "storage failure");
            return (self.status(), "internal error").into_response();
        }
        let body = self.to_string();
        (self.status(), body).into_response()
    }
}
