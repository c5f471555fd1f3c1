//! Block specific errors

use thiserror::Error;

use super::BlockId;

/// Errors raised while processing blocks.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BlockError {
    /// Saved block data had an unexpected shape for this block.
    #[error("saved data for block {id} has an unexpected shape")]
    UnexpectedBlockData { id: BlockId },

    /// A comparison expression received values it cannot order.
    #[error("cannot compare {left} with {right}")]
    IncomparableValues { left: String, right: String },
}
