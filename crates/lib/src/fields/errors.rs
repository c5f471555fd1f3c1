//! Field tree specific errors

use thiserror::Error;

/// Errors reported by logical field readers and writers.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FieldError {
    /// No value is bound at the requested path.
    #[error("no field at path: {path}")]
    NotFound { path: String },
}

impl FieldError {
    /// Check if this error indicates a missing field.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FieldError::NotFound { .. })
    }
}
