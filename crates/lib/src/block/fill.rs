//! The parse-as-many-as-fit combinator.

use std::sync::Arc;

use tracing::debug;

use crate::context::Context;
use crate::Result;

use super::{Block, BlockId};

/// Repeats its inner block until an iteration fails, then succeeds.
///
/// Each iteration runs inside its own transaction: a successful iteration
/// commits, the failing one rolls back. The failed attempt therefore leaves
/// no trace, and the context ends up positioned exactly where the failing
/// iteration began.
pub struct FillBlock {
    id: BlockId,
    inner: Arc<dyn Block>,
}

impl FillBlock {
    /// Creates a fill around `inner`.
    pub fn new(inner: Arc<dyn Block>) -> Self {
        Self {
            id: BlockId::next(),
            inner,
        }
    }
}

impl Block for FillBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        loop {
            let mut txn = ctx.begin_transaction()?;
            match self.inner.process(ctx) {
                Ok(()) => txn.commit()?,
                // A malformed description is a programmer error, not the
                // end of the data; it must not read as a clean stop.
                Err(err) if err.is_argument_error() => {
                    txn.rollback()?;
                    return Err(err);
                }
                Err(err) => {
                    debug!("fill stopped: {err}");
                    txn.rollback()?;
                    return Ok(());
                }
            }
        }
    }
}
