//! The path re-rooting combinator.

use std::sync::Arc;

use crate::context::Context;
use crate::Result;

use super::{Block, BlockId, Expr, eval};
use crate::path::NodePath;

/// Re-roots the logical path around its inner block.
///
/// Saves the current path, applies the late-bound container path, processes
/// the inner block, and restores the saved path on all exit paths. Children
/// of the inner block can then address a nested structure with paths
/// evaluated relative to the container.
pub struct ContainerBlock {
    id: BlockId,
    path: Expr<NodePath>,
    inner: Arc<dyn Block>,
}

impl ContainerBlock {
    /// Creates a container around `inner`.
    pub fn new(path: Expr<NodePath>, inner: Arc<dyn Block>) -> Self {
        Self {
            id: BlockId::next(),
            path,
            inner,
        }
    }
}

impl Block for ContainerBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        let target = eval(&self.path, &*ctx)?;
        let saved = ctx.path();
        ctx.change_path(&target)?;
        let result = self.inner.process(ctx);
        // The saved path is absolute, so this restores it exactly.
        let restored = ctx.change_path(&saved);
        result.and(restored)
    }
}
