//! The field leaf.

use std::sync::Arc;

use crate::context::Context;
use crate::convert::Converter;
use crate::path::NodePath;
use crate::value::Value;
use crate::Result;

use super::{Block, BlockId, Expr, eval, lit};

/// The leaf that binds a field.
///
/// Path, width, converter, and default are all late-bound: they are
/// evaluated against the context each time the block processes, so a width
/// can depend on a previously decoded length field and a path on a loop
/// variable. This is the only block that mutates the field map.
pub struct FieldBlock {
    id: BlockId,
    path: Expr<NodePath>,
    width: Expr<u64>,
    converter: Expr<Arc<dyn Converter>>,
    default: Expr<Option<Value>>,
}

impl FieldBlock {
    /// Creates a field leaf with no default.
    pub fn new(path: Expr<NodePath>, width: Expr<u64>, converter: Expr<Arc<dyn Converter>>) -> Self {
        Self {
            id: BlockId::next(),
            path,
            width,
            converter,
            default: lit(None),
        }
    }

    /// Sets the default substituted when conversion (decoding) or the field
    /// read (encoding) fails.
    pub fn with_default(mut self, default: Expr<Option<Value>>) -> Self {
        self.default = default;
        self
    }
}

impl Block for FieldBlock {
    fn id(&self) -> BlockId {
        self.id
    }

    fn process(&self, ctx: &mut dyn Context) -> Result<()> {
        let path = eval(&self.path, &*ctx)?;
        let width = eval(&self.width, &*ctx)?;
        let converter = eval(&self.converter, &*ctx)?;
        let default = eval(&self.default, &*ctx)?;
        ctx.map_field(&path, width, converter.as_ref(), default.as_ref())
    }
}
