//! Stream specific errors

use thiserror::Error;

/// Errors reported by bit readers and writers.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StreamError {
    /// A cursor move would land outside the stream.
    #[error("cursor move to bit {target} is outside the {len}-bit stream")]
    OutOfBounds { target: i64, len: u64 },

    /// A read or write would run past the end of the stream.
    #[error("{requested} bits at position {position} run past the {len}-bit stream")]
    PastEnd {
        position: u64,
        requested: u64,
        len: u64,
    },
}

impl StreamError {
    /// Check if this error indicates a cursor leaving the stream.
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self, StreamError::OutOfBounds { .. })
    }
}
