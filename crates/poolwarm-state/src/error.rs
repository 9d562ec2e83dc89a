//! Error types for the request store.

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur when reading or mutating request records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("request not found: {0}")]
    NotFound(String),

    #[error("request already finalized: {0}")]
    Terminal(String),
}
