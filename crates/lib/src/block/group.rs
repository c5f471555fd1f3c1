//! The sequence combinator.

use std::sync::Arc;

use crate::context::Context;
use crate::Result;

use super::{Block, BlockId};

/// An ordered sequence of children.
///
/// Children process in list order; the first error is returned. No implicit
/// transaction is opened: a caller that needs speculation wraps the group in
/// [`super::FillBlock`] or an explicit transaction.
pub struct GroupBlock {
    id: BlockId,
    children: Vec<Arc<dyn Block>>,
}

impl GroupBlock {
    /// Creates a group over `children`.
    pub fn new(children: Vec<Arc<dyn Block>>) -> Self {
        Self {
            id: BlockId::next(),
            children,
        }
    }
}

impl Block for GroupBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        for child in &self.children {
            child.process(ctx)?;
        }
        Ok(())
    }
}
