//! The conditional combinators.

use std::sync::Arc;

use crate::context::Context;
use crate::Result;

use super::{Block, BlockId, Expr, eval};

/// Processes its inner block only when the condition holds.
///
/// A false condition is success with no side effects.
pub struct ConditionalBlock {
    id: BlockId,
    condition: Expr<bool>,
    inner: Arc<dyn Block>,
}

impl ConditionalBlock {
    /// Creates a conditional around `inner`.
    pub fn new(condition: Expr<bool>, inner: Arc<dyn Block>) -> Self {
        Self {
            id: BlockId::next(),
            condition,
            inner,
        }
    }
}

impl Block for ConditionalBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        if eval(&self.condition, &*ctx)? {
            self.inner.process(ctx)?;
        }
        Ok(())
    }
}

/// Processes one of two blocks depending on the condition.
pub struct ConditionalElseBlock {
    id: BlockId,
    condition: Expr<bool>,
    when_true: Arc<dyn Block>,
    when_false: Arc<dyn Block>,
}

impl ConditionalElseBlock {
    /// Creates a two-armed conditional.
    pub fn new(condition: Expr<bool>, when_true: Arc<dyn Block>, when_false: Arc<dyn Block>) -> Self {
        Self {
            id: BlockId::next(),
            condition,
            when_true,
            when_false,
        }
    }
}

impl Block for ConditionalElseBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        if eval(&self.condition, &*ctx)? {
            self.when_true.process(ctx)
        } else {
            self.when_false.process(ctx)
        }
    }
}
