//! The cursor offset combinator.

use crate::context::Context;
use crate::Result;

use super::{Block, BlockId, Expr, eval};

/// Moves the bit position by a late-bound offset.
///
/// Positive offsets skip forward, negative offsets retreat.
pub struct OffsetBlock {
    id: BlockId,
    offset: Expr<i64>,
}

impl OffsetBlock {
    /// Creates an offset block.
    pub fn new(offset: Expr<i64>) -> Self {
        Self {
            id: BlockId::next(),
            offset,
        }
    }
}

impl Block for OffsetBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        let offset = eval(&self.offset, &*ctx)?;
        ctx.move_by(offset)
    }
}
