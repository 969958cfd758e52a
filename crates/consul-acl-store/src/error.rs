//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Token not found.
    #[error("token not found: {0}")]
    NotFound(String),

    /// A token with the same identifier already exists.
    #[error("token already exists: {0}")]
    AlreadyExists(String),

    /// The store rejected the data it was given.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The store could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
