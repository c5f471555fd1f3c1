//! Deferred field writing.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::path::NodePath;
use crate::value::Value;
use crate::{Result, Transaction};

use super::FieldWrite;

/// A transactional adapter over a [`FieldWrite`].
///
/// The decoding side stages `(path, value)` pairs here instead of touching
/// the sink. Each transaction marks the queue length at begin; rollback
/// truncates back to the mark, and the commit of the outermost open
/// transaction applies the whole queue to the sink in insertion order.
pub struct DeferredFieldWriter {
    state: Rc<RefCell<DeferredState>>,
}

struct DeferredState {
    sink: Box<dyn FieldWrite>,
    queue: Vec<(NodePath, Value)>,
    marks: Vec<usize>,
}

impl DeferredFieldWriter {
    /// Wraps a sink.
    pub fn new(sink: Box<dyn FieldWrite>) -> Self {
        Self {
            state: Rc::new(RefCell::new(DeferredState {
                sink,
                queue: Vec::new(),
                marks: Vec::new(),
            })),
        }
    }

    /// Number of staged writes not yet applied.
    pub fn queued(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Snapshots the queue and returns the transaction handle resolving it.
    pub fn begin_transaction(&self) -> Transaction {
        let depth = {
            let mut state = self.state.borrow_mut();
            let len = state.queue.len();
            state.marks.push(len);
            state.marks.len()
        };

        let on_rollback = Rc::clone(&self.state);
        let on_commit = Rc::clone(&self.state);
        Transaction::new()
            .on_rollback(move || {
                let mut state = on_rollback.borrow_mut();
                state.marks.truncate(depth);
                if let Some(mark) = state.marks.pop() {
                    state.queue.truncate(mark);
                }
                Ok(())
            })
            .on_commit(move || {
                let mut state = on_commit.borrow_mut();
                state.marks.truncate(depth);
                state.marks.pop();
                if state.marks.is_empty() {
                    state.apply()?;
                }
                Ok(())
            })
    }
}

impl DeferredState {
    fn apply(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Ok(());
        }
        debug!(fields = self.queue.len(), "applying deferred field writes");
        for (path, value) in self.queue.drain(..) {
            self.sink.write_field(&path, value)?;
        }
        Ok(())
    }
}

impl FieldWrite for DeferredFieldWriter {
    fn write_field(&mut self, path: &NodePath, value: Value) -> Result<()> {
        self.state
            .borrow_mut()
            .queue
            .push((path.clone(), value));
        Ok(())
    }
}

impl Clone for DeferredFieldWriter {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl std::fmt::Debug for DeferredFieldWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("DeferredFieldWriter")
            .field("queued", &state.queue.len())
            .field("open_marks", &state.marks.len())
            .finish()
    }
}
