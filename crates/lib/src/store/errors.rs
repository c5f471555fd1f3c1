//! Store specific errors

use thiserror::Error;

/// Errors that can occur in the transactional key-value stores.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested key is not present.
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// An insert collided with an existing key.
    #[error("duplicate key: {key}")]
    DuplicateKey { key: String },
}

impl StoreError {
    /// Check if this error indicates a missing key.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound { .. })
    }

    /// Check if this error indicates a key collision.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, StoreError::DuplicateKey { .. })
    }
}
