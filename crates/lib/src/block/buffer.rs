//! The buffered-window combinator.

use std::sync::Arc;

use crate::context::{Context, WindowContext};
use crate::Result;

use super::{Block, BlockId, Expr, eval};

/// Confines its inner block to a bounded bit window.
///
/// The late-bound length is evaluated, the context is wrapped in a
/// [`WindowContext`] starting at the current position, and the inner block
/// processes against the wrapped context. Inner operations that would step
/// outside `[0, length]` fail; the window is never padded, so an underrun is
/// permitted and the cursor simply stays where the inner block left it.
pub struct BufferBlock {
    id: BlockId,
    length: Expr<u64>,
    inner: Arc<dyn Block>,
}

impl BufferBlock {
    /// Creates a buffer of late-bound `length` bits around `inner`.
    pub fn new(length: Expr<u64>, inner: Arc<dyn Block>) -> Self {
        Self {
            id: BlockId::next(),
            length,
            inner,
        }
    }
}

impl Block for BufferBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        let length = eval(&self.length, &*ctx)?;
        let mut window = WindowContext::new(ctx, length);
        self.inner.process(&mut window)
    }
}
