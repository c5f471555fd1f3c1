//! The buffered-window decorator.

use std::any::Any;
use std::rc::Rc;

use crate::block::BlockId;
use crate::convert::Converter;
use crate::fields::FieldMapping;
use crate::path::NodePath;
use crate::value::Value;
use crate::{Result, Transaction};

use super::{Context, ContextError};

/// A decorator confining a context to a bounded bit window.
///
/// The window starts at the wrapped context's position when the decorator is
/// created and spans `length` bits. Positions observed through the decorator
/// are relative to the window start. Any move or field binding whose
/// prospective relative position leaves `[0, length]` fails with
/// [`ContextError::PositionOutOfWindow`] before the wrapped context is
/// touched. Everything else passes through, so windows nest and
/// transactions behave as usual.
pub struct WindowContext<'a> {
    inner: &'a mut dyn Context,
    start: u64,
    length: u64,
}

impl<'a> WindowContext<'a> {
    /// Wraps `inner` in a window of `length` bits starting at its current
    /// position.
    pub fn new(inner: &'a mut dyn Context, length: u64) -> Self {
        let start = inner.position();
        Self {
            inner,
            start,
            length,
        }
    }

    /// The window length in bits.
    pub fn length(&self) -> u64 {
        self.length
    }
}

impl Context for WindowContext<'_> {
    fn path(&self) -> NodePath {
        self.inner.path()
    }

    fn change_path(&mut self, path: &NodePath) -> Result<()> {
        self.inner.change_path(path)
    }

    fn position(&self) -> u64 {
        self.inner.position() - self.start
    }

    fn move_by(&mut self, offset: i64) -> Result<()> {
        let target = self.position() as i64 + offset;
        if target < 0 || target as u64 > self.length {
            return Err(ContextError::PositionOutOfWindow {
                position: target,
                length: self.length,
            }
            .into());
        }
        self.inner.move_by(offset)
    }

    fn map_field(
        &mut self,
        field_path: &NodePath,
        bits: u64,
        converter: &dyn Converter,
        default: Option<&Value>,
    ) -> Result<()> {
        let end = self.position() + bits;
        if end > self.length {
            return Err(ContextError::PositionOutOfWindow {
                position: end as i64,
                length: self.length,
            }
            .into());
        }
        self.inner.map_field(field_path, bits, converter, default)
    }

    fn get_field_mapping(&self, field_path: &NodePath) -> Result<FieldMapping> {
        self.inner.get_field_mapping(field_path)
    }

    fn get_variable(&self, name: &str) -> Result<Value> {
        self.inner.get_variable(name)
    }

    fn set_variable(&mut self, name: &str, value: Value) -> Result<()> {
        self.inner.set_variable(name, value)
    }

    fn remove_variable(&mut self, name: &str) -> Result<()> {
        self.inner.remove_variable(name)
    }

    fn store_block_data(&mut self, block: BlockId, data: Rc<dyn Any>) -> Result<()> {
        self.inner.store_block_data(block, data)
    }

    fn retrieve_block_data(&self, block: BlockId) -> Result<Rc<dyn Any>> {
        self.inner.retrieve_block_data(block)
    }

    fn begin_transaction(&mut self) -> Result<Transaction> {
        self.inner.begin_transaction()
    }
}
