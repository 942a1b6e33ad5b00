//! Error types for the gantry image store.

use gantry_core::KeyError;
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during image store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed key or metadata document — the caller's fault, never retried.
    #[error("validation error: {0}")]
    Validation(String),

    /// No record matched the requested key.
    #[error("not found: {0}")]
    NotFound(String),

    /// The underlying backend failed (connectivity, disk, transaction).
    #[error("backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),
}

impl From<KeyError> for StoreError {
    fn from(err: KeyError) -> Self {
        StoreError::Validation(err.to_string())
    }
}
