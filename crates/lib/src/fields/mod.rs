//! Logical field tree contracts and reference implementations.
//!
//! The logical side of a codec run is a tree of named, typed values. During
//! decoding the engine writes into it through [`FieldWrite`]; during encoding
//! it reads from it through [`FieldRead`]. [`MemoryFieldTree`] is the
//! in-memory realization of both, and [`DeferredFieldWriter`] is the
//! transactional adapter that holds writes back until the outermost
//! transaction commits.

mod errors;
pub use errors::FieldError;

mod deferred;
pub use deferred::DeferredFieldWriter;

mod memory;
pub use memory::MemoryFieldTree;

use serde::{Deserialize, Serialize};

use crate::path::NodePath;
use crate::value::{BitValue, Value};
use crate::Result;

/// Read access to the logical field tree.
pub trait FieldRead {
    /// Reads the value bound at `path`.
    fn read_field(&self, path: &NodePath) -> Result<Value>;
}

/// Write access to the logical field tree.
pub trait FieldWrite {
    /// Binds `value` at `path`, overwriting any previous binding.
    fn write_field(&mut self, path: &NodePath, value: Value) -> Result<()>;
}

/// The record produced when a field is bound during a run.
///
/// Captures where the field lives in the logical tree, where its bits sit in
/// the stream, the raw bit payload, and the typed interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Absolute, non-root logical path of the field.
    pub path: NodePath,
    /// Bit position of the first bit of the raw payload.
    pub position: u64,
    /// The raw bit-level payload.
    pub raw: BitValue,
    /// The typed interpretation of the payload.
    pub converted: Value,
}
