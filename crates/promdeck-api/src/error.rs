//! API error taxonomy and its HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use promdeck_store::StoreError;

/// Result type alias for API handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Everything an upload or retrieval request can fail with.
///
/// The client-facing bodies are fixed strings; scripts scrape them.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no metrics file uploaded")]
    MissingFile,

    #[error("invalid metrics file format")]
    InvalidFormat,

    #[error("metrics snapshot not found")]
    SnapshotNotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::MissingFile => {
                (StatusCode::BAD_REQUEST, "No metrics file uploaded").into_response()
            }
            ApiError::InvalidFormat => (
                StatusCode::BAD_REQUEST,
                "Invalid metrics file format. Please upload a valid Prometheus metrics file.",
            )
                .into_response(),
            ApiError::SnapshotNotFound => {
                (StatusCode::NOT_FOUND, "Metrics not found").into_response()
            }
            ApiError::Store(e) => {
                tracing::error!(error = %e, "snapshot store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
