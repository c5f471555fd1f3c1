//! The encoding context.

use std::any::Any;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::block::{Block, BlockId};
use crate::convert::Converter;
use crate::fields::{FieldMapping, FieldRead};
use crate::path::NodePath;
use crate::store::StoreError;
use crate::stream::{BitSeek, BitWrite, DeferredBitWriter};
use crate::value::Value;
use crate::{Result, Transaction};

use super::{Context, ContextError, CoreState, require_field_path};

/// A coding context bound to a field-tree source and a bit writer.
///
/// Encoding reads typed values out of the logical tree, renders them to
/// bits, and stages them into a deferred writer; the underlying stream only
/// sees them when the outermost transaction commits.
pub struct EncodeContext {
    core: CoreState,
    writer: DeferredBitWriter,
    source: Box<dyn FieldRead>,
}

impl EncodeContext {
    /// Creates a context over a bit sink and a field source.
    pub fn new(sink: Box<dyn BitWrite>, source: Box<dyn FieldRead>) -> Self {
        Self {
            core: CoreState::new(),
            writer: DeferredBitWriter::new(sink),
            source,
        }
    }

    /// Processes `root` inside a top-level transaction.
    ///
    /// On success the transaction commits and the queued bits flush to the
    /// sink in insertion order; on failure everything rolls back and the
    /// error is returned.
    pub fn run(&mut self, root: &dyn Block) -> Result<()> {
        let mut txn = self.begin_transaction()?;
        match root.process(self) {
            Ok(()) => txn.commit(),
            Err(err) => {
                if let Err(rollback_err) = txn.rollback() {
                    debug!("rollback after failed encode also failed: {rollback_err}");
                }
                Err(err)
            }
        }
    }

    /// The accumulated field mappings, sorted by path.
    pub fn mappings(&self) -> Vec<FieldMapping> {
        self.core.mappings()
    }

    /// The live variables, sorted by name.
    pub fn variables(&self) -> Vec<(String, Value)> {
        self.core.variables_snapshot()
    }

    /// The block identities with saved scratch data, sorted.
    pub fn scratch_keys(&self) -> Vec<BlockId> {
        self.core.scratch_keys()
    }
}

impl Context for EncodeContext {
    fn path(&self) -> NodePath {
        self.core.path()
    }

    fn change_path(&mut self, path: &NodePath) -> Result<()> {
        self.core.change_path(path);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.writer.position()
    }

    fn move_by(&mut self, offset: i64) -> Result<()> {
        self.writer.move_by(offset)
    }

    fn map_field(
        &mut self,
        field_path: &NodePath,
        bits: u64,
        converter: &dyn Converter,
        default: Option<&Value>,
    ) -> Result<()> {
        require_field_path(field_path)?;
        if bits == 0 {
            return Err(ContextError::ZeroWidthField {
                path: field_path.to_string(),
            }
            .into());
        }
        let absolute = self.core.path.borrow().combine(field_path);
        // Checked before any side effect so a duplicate leaves no trace.
        if self.core.field_map.contains_key(&absolute) {
            return Err(StoreError::DuplicateKey {
                key: absolute.to_string(),
            }
            .into());
        }

        let value = match self.source.read_field(&absolute) {
            Ok(value) => value,
            Err(err) => match default {
                Some(value) => value.clone(),
                None => return Err(err),
            },
        };
        let position = self.position();
        let raw = converter.encode(&*self, &value, bits)?;
        trace!(path = %absolute, bits, position, "encoded field");

        self.writer.write(&raw)?;
        self.core.field_map.insert(
            absolute.clone(),
            FieldMapping {
                path: absolute,
                position,
                raw,
                converted: value,
            },
        )?;
        Ok(())
    }

    fn get_field_mapping(&self, field_path: &NodePath) -> Result<FieldMapping> {
        self.core.get_field_mapping(field_path)
    }

    fn get_variable(&self, name: &str) -> Result<Value> {
        self.core.get_variable(name)
    }

    fn set_variable(&mut self, name: &str, value: Value) -> Result<()> {
        self.core.set_variable(name, value)
    }

    fn remove_variable(&mut self, name: &str) -> Result<()> {
        self.core.remove_variable(name)
    }

    fn store_block_data(&mut self, block: BlockId, data: Rc<dyn Any>) -> Result<()> {
        self.core.scratch.set(block, data);
        Ok(())
    }

    fn retrieve_block_data(&self, block: BlockId) -> Result<Rc<dyn Any>> {
        self.core.scratch.get(&block)
    }

    fn begin_transaction(&mut self) -> Result<Transaction> {
        debug!(position = self.writer.position(), "beginning encode transaction");
        let mut txn = Transaction::new();
        txn.register(self.core.begin_layers());
        txn.register(self.writer.begin_transaction());
        Ok(txn)
    }
}
