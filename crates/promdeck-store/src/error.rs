//! Error types for the Promdeck snapshot store.

use thiserror::Error;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| crate::error::StoreError::$variant(e.to_string())
    };
}
pub(crate) use map_err;

/// Result type alias for snapshot store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during snapshot store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),
}
