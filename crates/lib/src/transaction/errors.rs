//! Transaction specific errors

use thiserror::Error;

/// Errors that can occur while resolving a transaction.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum TransactionError {
    /// Commit was requested on a transaction that already rolled back.
    #[error("transaction was already rolled back")]
    AlreadyRolledBack,
}

impl TransactionError {
    /// Check if this error indicates the transaction was already resolved.
    pub fn is_already_resolved(&self) -> bool {
        matches!(self, TransactionError::AlreadyRolledBack)
    }
}
