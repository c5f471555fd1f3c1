//! The decoding context.

use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::block::{Block, BlockId};
use crate::convert::Converter;
use crate::fields::{DeferredFieldWriter, FieldMapping, FieldWrite};
use crate::path::NodePath;
use crate::store::StoreError;
use crate::stream::BitRead;
use crate::value::Value;
use crate::{Result, Transaction};

use super::{Context, ContextError, CoreState, require_field_path};

/// A coding context bound to a bit reader and a field-tree sink.
///
/// Decoding reads bits off the stream, converts them, and stages the typed
/// values into the field tree through a deferred writer; the sink only sees
/// them when the outermost transaction commits.
pub struct DecodeContext {
    core: CoreState,
    reader: Rc<RefCell<Box<dyn BitRead>>>,
    fields: DeferredFieldWriter,
}

impl DecodeContext {
    /// Creates a context over a reader and a field sink.
    pub fn new(reader: Box<dyn BitRead>, sink: Box<dyn FieldWrite>) -> Self {
        Self {
            core: CoreState::new(),
            reader: Rc::new(RefCell::new(reader)),
            fields: DeferredFieldWriter::new(sink),
        }
    }

    /// Processes `root` inside a top-level transaction.
    ///
    /// On success the transaction commits and the staged field writes reach
    /// the sink; on failure everything rolls back and the error is returned.
    pub fn run(&mut self, root: &dyn Block) -> Result<()> {
        let mut txn = self.begin_transaction()?;
        match root.process(self) {
            Ok(()) => txn.commit(),
            Err(err) => {
                if let Err(rollback_err) = txn.rollback() {
                    debug!("rollback after failed decode also failed: {rollback_err}");
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

impl Context for DecodeContext {
    fn path(&self) -> NodePath {
        self.core.path()
    }

    fn change_path(&mut self, path: &NodePath) -> Result<()> {
        self.core.change_path(path);
        Ok(())
    }

    fn position(&self) -> u64 {
        self.reader.borrow().position()
    }

    fn move_by(&mut self, offset: i64) -> Result<()> {
        self.reader.borrow_mut().move_by(offset)
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

        let position = self.position();
        let raw = self.reader.borrow_mut().read(bits)?;
        let converted = match converter.decode(&*self, &raw) {
            Ok(value) => value,
            Err(err) => match default {
                Some(value) => value.clone(),
                None => return Err(err),
            },
        };
        trace!(path = %absolute, bits, position, "decoded field");

        self.fields.write_field(&absolute, converted.clone())?;
        self.core.field_map.insert(
            absolute.clone(),
            FieldMapping {
                path: absolute,
                position,
                raw,
                converted,
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
        let reader = Rc::clone(&self.reader);
        let position = reader.borrow().position();
        debug!(position, "beginning decode transaction");
        let mut txn = Transaction::new().on_rollback(move || {
            let mut reader = reader.borrow_mut();
            let current = reader.position() as i64;
            reader.move_by(position as i64 - current)
        });
        txn.register(self.core.begin_layers());
        txn.register(self.fields.begin_transaction());
        Ok(txn)
    }
}
