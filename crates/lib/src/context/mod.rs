//! Coding contexts: the mutable state carrier of a codec run.
//!
//! A context owns every piece of state a block may touch: the logical path
//! cursor, the bit position of the bound stream, variables, the accumulated
//! field map, and per-block scratch data. Blocks never hold state of their
//! own; they read and mutate it through the [`Context`] trait, which is what
//! makes speculative parsing recoverable.
//!
//! # Transactions
//!
//! [`Context::begin_transaction`] snapshots every layer at once: the path,
//! the three key-value stores, the direction-specific deferred writer, and
//! the stream cursor. The returned [`Transaction`] drives all of them, so a
//! rollback restores the context bit-for-bit to its state at begin.
//!
//! # Directions
//!
//! [`DecodeContext`] binds a bit reader and a field-tree sink;
//! [`EncodeContext`] binds a field-tree source and a deferred bit writer.
//! [`WindowContext`] is a decorator that re-scopes positions to a bounded
//! window without touching the wrapped context's contract.

mod errors;
pub use errors::ContextError;

mod decode;
pub use decode::DecodeContext;

mod encode;
pub use encode::EncodeContext;

mod window;
pub use window::WindowContext;

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use crate::block::BlockId;
use crate::convert::Converter;
use crate::fields::FieldMapping;
use crate::path::NodePath;
use crate::store::TxnMap;
use crate::value::Value;
use crate::{Result, Transaction};

/// The state carrier handed to every block while it processes.
///
/// All mutating operations stage through the context so that a transaction
/// rollback can restore the observable state exactly.
pub trait Context {
    /// Current absolute logical path.
    fn path(&self) -> NodePath;

    /// Moves the logical path cursor: a relative path is appended, an
    /// absolute path replaces.
    fn change_path(&mut self, path: &NodePath) -> Result<()>;

    /// Current bit position of the bound stream.
    fn position(&self) -> u64;

    /// Moves the bit position by `offset` bits.
    fn move_by(&mut self, offset: i64) -> Result<()>;

    /// Binds a field of `bits` bits at `field_path`.
    ///
    /// Decoding reads the bits and converts them; encoding reads the logical
    /// value and renders it. `field_path` must be absolute and non-root,
    /// `bits` must be positive, and binding the same path twice in one run
    /// is a duplicate-key error.
    fn map_field(
        &mut self,
        field_path: &NodePath,
        bits: u64,
        converter: &dyn Converter,
        default: Option<&Value>,
    ) -> Result<()>;

    /// Looks up the mapping record of a previously bound field.
    fn get_field_mapping(&self, field_path: &NodePath) -> Result<FieldMapping>;

    /// Reads a variable.
    fn get_variable(&self, name: &str) -> Result<Value>;

    /// Sets a variable, overwriting any previous value.
    fn set_variable(&mut self, name: &str, value: Value) -> Result<()>;

    /// Removes a variable. Removing an unset variable is a no-op.
    fn remove_variable(&mut self, name: &str) -> Result<()>;

    /// Saves opaque per-block data keyed by the block's identity.
    fn store_block_data(&mut self, block: BlockId, data: Rc<dyn Any>) -> Result<()>;

    /// Retrieves previously saved per-block data.
    fn retrieve_block_data(&self, block: BlockId) -> Result<Rc<dyn Any>>;

    /// Snapshots every state layer and returns the handle resolving them.
    fn begin_transaction(&mut self) -> Result<Transaction>;
}

/// The direction-independent layers: path, variables, field map, scratch.
pub(crate) struct CoreState {
    pub(crate) path: Rc<RefCell<NodePath>>,
    pub(crate) variables: TxnMap<String, Value>,
    pub(crate) field_map: TxnMap<NodePath, FieldMapping>,
    pub(crate) scratch: TxnMap<BlockId, Rc<dyn Any>>,
}

impl CoreState {
    pub(crate) fn new() -> Self {
        Self {
            path: Rc::new(RefCell::new(NodePath::root())),
            variables: TxnMap::new(),
            field_map: TxnMap::new(),
            scratch: TxnMap::new(),
        }
    }

    pub(crate) fn path(&self) -> NodePath {
        self.path.borrow().clone()
    }

    pub(crate) fn change_path(&self, path: &NodePath) {
        let combined = self.path.borrow().combine(path);
        *self.path.borrow_mut() = combined;
    }

    pub(crate) fn get_variable(&self, name: &str) -> Result<Value> {
        require_variable_name(name)?;
        self.variables.get(&name.to_string())
    }

    pub(crate) fn set_variable(&self, name: &str, value: Value) -> Result<()> {
        require_variable_name(name)?;
        self.variables.set(name.to_string(), value);
        Ok(())
    }

    pub(crate) fn remove_variable(&self, name: &str) -> Result<()> {
        require_variable_name(name)?;
        self.variables.remove(&name.to_string());
        Ok(())
    }

    pub(crate) fn get_field_mapping(&self, field_path: &NodePath) -> Result<FieldMapping> {
        require_field_path(field_path)?;
        self.field_map.get(field_path)
    }

    /// Snapshots the direction-independent layers: the path plus the three
    /// stores. Returned as one transaction for the caller to register.
    pub(crate) fn begin_layers(&self) -> Transaction {
        let path = Rc::clone(&self.path);
        let saved = path.borrow().clone();
        let mut txn = Transaction::new().on_rollback(move || {
            *path.borrow_mut() = saved;
            Ok(())
        });
        txn.register(self.variables.begin_transaction());
        txn.register(self.field_map.begin_transaction());
        txn.register(self.scratch.begin_transaction());
        txn
    }

    pub(crate) fn mappings(&self) -> Vec<FieldMapping> {
        let mut mappings: Vec<FieldMapping> =
            self.field_map.entries().into_iter().map(|(_, m)| m).collect();
        mappings.sort_by(|a, b| a.path.as_str().cmp(b.path.as_str()));
        mappings
    }

    pub(crate) fn variables_snapshot(&self) -> Vec<(String, Value)> {
        let mut entries = self.variables.entries();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries
    }

    pub(crate) fn scratch_keys(&self) -> Vec<BlockId> {
        let mut keys: Vec<BlockId> = self.scratch.entries().into_iter().map(|(k, _)| k).collect();
        keys.sort();
        keys
    }
}

pub(crate) fn require_field_path(path: &NodePath) -> Result<()> {
    if !path.is_absolute() {
        return Err(ContextError::FieldPathNotAbsolute {
            path: path.to_string(),
        }
        .into());
    }
    if path.is_root() {
        return Err(ContextError::FieldPathIsRoot.into());
    }
    Ok(())
}

pub(crate) fn require_variable_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ContextError::BlankVariableName.into());
    }
    Ok(())
}
