//! Deferred definitions and their later execution.

use std::rc::Rc;
use std::sync::Arc;

use crate::context::Context;
use crate::path::NodePath;
use crate::Result;

use super::{Block, BlockError, BlockId};

/// The `(path, position)` capture a deferred block leaves in scratch.
struct SavedSite {
    path: NodePath,
    position: u64,
}

/// Skips its inner block, capturing where it would have run.
///
/// Processing records the current `(path, position)` into the context's
/// scratch store under this block's identity and succeeds without touching
/// the inner block. A later [`ProcessBlock`] referring to this block
/// executes the inner definition at the captured site. This is how a format
/// expresses forward references: a header defers its payload definition and
/// a trailer processes it once intervening fields have advanced the cursor.
pub struct DeferredBlock {
    id: BlockId,
    inner: Arc<dyn Block>,
}

impl DeferredBlock {
    /// Creates a deferred wrapper around `inner`.
    pub fn new(inner: Arc<dyn Block>) -> Self {
        Self {
            id: BlockId::next(),
            inner,
        }
    }

    /// The inner definition executed by a [`ProcessBlock`].
    pub fn inner(&self) -> &Arc<dyn Block> {
        &self.inner
    }
}

impl Block for DeferredBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        let site = SavedSite {
            path: ctx.path(),
            position: ctx.position(),
        };
        ctx.store_block_data(self.id, Rc::new(site))
    }
}

/// Executes a previously deferred definition at its captured site.
///
/// Retrieves the target's saved `(path, position)`, applies them, processes
/// the deferred inner block there, and restores the caller's `(path,
/// position)` on all exit paths. Deferred execution is therefore
/// position-neutral to its caller.
pub struct ProcessBlock {
    id: BlockId,
    target: Arc<DeferredBlock>,
}

impl ProcessBlock {
    /// Creates a process block executing `target`'s inner definition.
    pub fn new(target: Arc<DeferredBlock>) -> Self {
        Self {
            id: BlockId::next(),
            target,
        }
    }

    fn apply_site(&self, ctx: &mut dyn Context, path: &NodePath, position: u64) -> Result<()> {
        ctx.change_path(path)?;
        let current = ctx.position() as i64;
        ctx.move_by(position as i64 - current)
    }
}

impl Block for ProcessBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        let data = ctx.retrieve_block_data(self.target.id())?;
        let site = data
            .downcast::<SavedSite>()
            .map_err(|_| BlockError::UnexpectedBlockData {
                id: self.target.id(),
            })?;

        let saved_path = ctx.path();
        let saved_position = ctx.position();

        let result = match self.apply_site(ctx, &site.path, site.position) {
            Ok(()) => self.target.inner().process(ctx),
            Err(err) => Err(err),
        };

        let restored = self.apply_site(ctx, &saved_path, saved_position);
        result.and(restored)
    }
}
