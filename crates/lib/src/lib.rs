//!
//! Bitweave: a bidirectional, bit-granular binary codec engine.
//!
//! A single declarative tree of blocks describes a packed binary format once
//! and is interpreted in both directions: decoding reads a bit stream and
//! populates a logical field tree, encoding reads a field tree and produces a
//! bit stream. Field widths are measured in bits, widths and presence may
//! depend on previously decoded values, and failed parse attempts roll back
//! without a trace.
//!
//! ## Core Concepts
//!
//! * **Blocks (`block::Block`)**: Immutable, composable nodes of the codec
//!   description. Leaves bind fields; combinators sequence, branch, repeat,
//!   window, and defer their children.
//! * **Contexts (`context::DecodeContext`, `context::EncodeContext`)**: The
//!   mutable state carrier handed to every block. A context owns the logical
//!   path cursor, the bit position, variables, the field map, and per-block
//!   scratch data.
//! * **Transactions (`transaction::Transaction`)**: Every mutable layer of a
//!   context can be snapshotted and atomically committed or rolled back, so
//!   speculative parsing such as [`block::FillBlock`] leaves the state
//!   bit-for-bit identical after an aborted attempt.
//! * **Paths (`path::NodePath`)**: Normalized slash-separated addresses into
//!   the logical field tree.
//! * **Streams (`stream::BitRead`, `stream::BitWrite`)**: Bit-addressed
//!   cursor contracts over the underlying binary data, with in-memory
//!   reference implementations.
//! * **Converters (`convert::Converter`)**: Translate between raw bit values
//!   and typed values in both directions.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bitweave::block::{FieldBlock, GroupBlock, lit};
//! use bitweave::context::DecodeContext;
//! use bitweave::convert::{Converter, Unsigned};
//! use bitweave::fields::MemoryFieldTree;
//! use bitweave::path::NodePath;
//! use bitweave::stream::MemoryBitReader;
//! use bitweave::value::Value;
//!
//! let schema = GroupBlock::new(vec![
//!     Arc::new(FieldBlock::new(
//!         lit(NodePath::from("/version")),
//!         lit(4),
//!         lit(Arc::new(Unsigned) as Arc<dyn Converter>),
//!     )),
//!     Arc::new(FieldBlock::new(
//!         lit(NodePath::from("/flags")),
//!         lit(4),
//!         lit(Arc::new(Unsigned) as Arc<dyn Converter>),
//!     )),
//! ]);
//!
//! let tree = MemoryFieldTree::new();
//! let reader = MemoryBitReader::from_bytes(vec![0x2A]);
//! let mut ctx = DecodeContext::new(Box::new(reader), Box::new(tree.clone()));
//! ctx.run(&schema)?;
//!
//! assert_eq!(tree.get(&NodePath::from("/version")), Some(Value::UInt(2)));
//! assert_eq!(tree.get(&NodePath::from("/flags")), Some(Value::UInt(10)));
//! # Ok::<(), bitweave::Error>(())
//! ```

pub mod block;
pub mod context;
pub mod convert;
pub mod fields;
pub mod path;
pub mod schema;
pub mod store;
pub mod stream;
pub mod transaction;
pub mod value;

/// Re-exports of the types most users touch first.
pub use block::Block;
pub use context::{Context, DecodeContext, EncodeContext};
pub use path::NodePath;
pub use transaction::Transaction;
pub use value::{BitValue, Value};

/// Result type used throughout the bitweave library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the bitweave library.
///
/// Every module owns a structured error enum; this type composes them so any
/// engine operation returns one `Result`. Errors stay plain values along the
/// block processing chain, which is what lets combinators such as
/// [`block::FillBlock`] inspect a failure and recover from it.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured path errors from the path module
    #[error(transparent)]
    Path(#[from] path::PathError),

    /// Structured bit-value errors from the value module
    #[error(transparent)]
    Value(#[from] value::ValueError),

    /// Structured transaction errors from the transaction module
    #[error(transparent)]
    Transaction(#[from] transaction::TransactionError),

    /// Structured store errors from the transactional key-value stores
    #[error(transparent)]
    Store(#[from] store::StoreError),

    /// Structured stream errors from bit readers and writers
    #[error(transparent)]
    Stream(#[from] stream::StreamError),

    /// Structured field-tree errors from logical field readers and writers
    #[error(transparent)]
    Field(#[from] fields::FieldError),

    /// Structured conversion errors from value converters
    #[error(transparent)]
    Convert(#[from] convert::ConvertError),

    /// Structured coding-context errors, including window violations
    #[error(transparent)]
    Context(#[from] context::ContextError),

    /// Structured block-processing errors
    #[error(transparent)]
    Block(#[from] block::BlockError),

    /// Structured schema-compilation errors
    #[error(transparent)]
    Schema(#[from] schema::SchemaError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Path(_) => "path",
            Error::Value(_) => "value",
            Error::Transaction(_) => "transaction",
            Error::Store(_) => "store",
            Error::Stream(_) => "stream",
            Error::Field(_) => "fields",
            Error::Convert(_) => "convert",
            Error::Context(_) => "context",
            Error::Block(_) => "block",
            Error::Schema(_) => "schema",
        }
    }

    /// Check if this error indicates a missing key, variable, field, or
    /// saved block state.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Store(err) => err.is_not_found(),
            Error::Field(err) => err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error indicates a duplicate key or field mapping.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::Store(store::StoreError::DuplicateKey { .. }))
    }

    /// Check if this error indicates a buffered-window violation.
    pub fn is_out_of_window(&self) -> bool {
        matches!(
            self,
            Error::Context(context::ContextError::PositionOutOfWindow { .. })
        )
    }

    /// Check if this error came from the underlying bit stream.
    pub fn is_stream_error(&self) -> bool {
        matches!(self, Error::Stream(_))
    }

    /// Check if this error came from a value converter.
    pub fn is_conversion_error(&self) -> bool {
        matches!(self, Error::Convert(_))
    }

    /// Check if this error indicates an invalid argument rather than bad
    /// data: a relative or root field path, a zero field width, a blank
    /// variable name, or a malformed path operation.
    pub fn is_argument_error(&self) -> bool {
        match self {
            Error::Path(_) => true,
            Error::Context(err) => err.is_argument_error(),
            _ => false,
        }
    }
}
