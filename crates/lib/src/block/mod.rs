//! The block algebra: composable nodes of a codec description.
//!
//! A codec is a tree of blocks. Each block exposes one operation,
//! [`Block::process`], which interprets the block against a coding context;
//! the same tree decodes or encodes depending on the context it is handed.
//! Errors are values and short-circuit: the first failing child stops its
//! parent, and combinators that speculate ([`FillBlock`]) open transactions
//! so an aborted attempt leaves no trace.
//!
//! Blocks are immutable after construction and shareable across runs and
//! contexts. Identity matters: [`BlockId`] is a monotone construction-time
//! id, and it is the key under which [`DeferredBlock`] saves its capture for
//! a later [`ProcessBlock`].
//!
//! # Late-bound expressions
//!
//! Every parameter a block evaluates at processing time is an [`Expr`]: a
//! closure over the evaluation context. [`lit`], [`var`], and [`field`]
//! build the common cases; anything else is an ordinary closure:
//!
//! ```
//! use std::sync::Arc;
//! use bitweave::block::Expr;
//!
//! let double_len: Expr<u64> = Arc::new(|ctx| {
//!     let len = ctx.get_field_mapping(&"/len".into())?;
//!     Ok(len.converted.as_uint().unwrap_or(0) * 2)
//! });
//! ```

mod errors;
pub use errors::BlockError;

mod buffer;
pub use buffer::BufferBlock;

mod choice;
pub use choice::{ChoiceBlock, ChoiceCase};

mod conditional;
pub use conditional::{ConditionalBlock, ConditionalElseBlock};

mod container;
pub use container::ContainerBlock;

mod deferred;
pub use deferred::{DeferredBlock, ProcessBlock};

mod field;
pub use field::FieldBlock;

mod fill;
pub use fill::FillBlock;

mod group;
pub use group::GroupBlock;

mod offset;
pub use offset::OffsetBlock;

mod repeat;
pub use repeat::RepeatBlock;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::Context;
use crate::path::NodePath;
use crate::value::Value;
use crate::Result;

/// A node of the codec description tree.
pub trait Block: Send + Sync {
    /// The stable identity of this block.
    fn id(&self) -> BlockId;

    /// Interprets this block against a coding context.
    fn process(&self, ctx: &mut dyn Context) -> Result<()>;
}

impl fmt::Debug for dyn Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block").field("id", &self.id()).finish()
    }
}

/// A stable, comparable block identity.
///
/// Assigned from a monotone counter at construction, so two structurally
/// identical sibling blocks never collide in the scratch store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(u64);

static NEXT_BLOCK_ID: AtomicU64 = AtomicU64::new(0);

impl BlockId {
    /// Mints a fresh identity; custom [`Block`] implementations call this
    /// once at construction and return the stored id from [`Block::id`].
    pub fn next() -> Self {
        BlockId(NEXT_BLOCK_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A late-bound expression evaluated against the context at processing time.
pub type Expr<T> = Arc<dyn Fn(&dyn Context) -> Result<T> + Send + Sync>;

/// Evaluates an expression against a context.
pub fn eval<T>(expr: &Expr<T>, ctx: &dyn Context) -> Result<T> {
    expr.as_ref()(ctx)
}

/// An expression that always yields `value`.
pub fn lit<T>(value: T) -> Expr<T>
where
    T: Clone + Send + Sync + 'static,
{
    Arc::new(move |_ctx| Ok(value.clone()))
}

/// An expression reading the variable `name`.
pub fn var(name: impl Into<String>) -> Expr<Value> {
    let name = name.into();
    Arc::new(move |ctx| ctx.get_variable(&name))
}

/// An expression reading the converted value of a previously bound field.
pub fn field(path: impl Into<NodePath>) -> Expr<Value> {
    let path = path.into();
    Arc::new(move |ctx| Ok(ctx.get_field_mapping(&path)?.converted))
}
