//! The counted repetition combinator.

use std::sync::Arc;

use crate::context::Context;
use crate::value::Value;
use crate::Result;

use super::{Block, BlockId, Expr, eval};

/// Repeats its inner block while a condition holds, exposing the iteration
/// index as a variable.
///
/// The index variable is scoped to the repeat: its prior value (set or
/// unset) is saved before the first iteration and restored on every exit
/// path. Within the loop the variable counts 0, 1, 2, … and the condition is
/// re-evaluated before each iteration. The first inner error propagates.
pub struct RepeatBlock {
    id: BlockId,
    condition: Expr<bool>,
    index_name: Expr<String>,
    inner: Arc<dyn Block>,
}

impl RepeatBlock {
    /// Creates a repeat around `inner`.
    pub fn new(condition: Expr<bool>, index_name: Expr<String>, inner: Arc<dyn Block>) -> Self {
        Self {
            id: BlockId::next(),
            condition,
            index_name,
            inner,
        }
    }

    fn iterate(&self, ctx: &mut dyn Context, name: &str) -> Result<()> {
        let mut index = 0u64;
        while eval(&self.condition, &*ctx)? {
            self.inner.process(ctx)?;
            index += 1;
            ctx.set_variable(name, Value::UInt(index))?;
        }
        Ok(())
    }
}

impl Block for RepeatBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        let name = eval(&self.index_name, &*ctx)?;
        let saved = match ctx.get_variable(&name) {
            Ok(value) => Some(value),
            Err(err) if err.is_not_found() => None,
            Err(err) => return Err(err),
        };
        ctx.set_variable(&name, Value::UInt(0))?;

        let result = self.iterate(ctx, &name);

        let restored = match saved {
            Some(value) => ctx.set_variable(&name, value),
            None => ctx.remove_variable(&name),
        };
        result.and(restored)
    }
}
