//! Deferred bit writing.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::value::BitValue;
use crate::{Result, Transaction};

use super::{BitSeek, BitWrite};

/// A transactional adapter over a [`BitWrite`].
///
/// Bit streams are rarely random-access for writes, so the encoding side
/// accumulates: `write` queues the value and advances the reported cursor,
/// leaving the underlying sink untouched. Each transaction marks the queue
/// length at begin; rollback truncates back to the mark, and the commit of
/// the outermost open transaction drains the whole queue into the sink in
/// insertion order. Inner commits only seal their slice of the queue.
///
/// Seeking repositions the cursor accounting only; the queue always drains
/// sequentially.
pub struct DeferredBitWriter {
    state: Rc<RefCell<DeferredState>>,
}

struct DeferredState {
    sink: Box<dyn BitWrite>,
    queue: Vec<BitValue>,
    marks: Vec<Mark>,
    position: u64,
}

struct Mark {
    queue_len: usize,
    position: u64,
}

impl DeferredBitWriter {
    /// Wraps a sink. The reported cursor starts at the sink's position.
    pub fn new(sink: Box<dyn BitWrite>) -> Self {
        let position = sink.position();
        Self {
            state: Rc::new(RefCell::new(DeferredState {
                sink,
                queue: Vec::new(),
                marks: Vec::new(),
                position,
            })),
        }
    }

    /// Number of bits currently queued and not yet flushed.
    pub fn queued_bits(&self) -> u64 {
        self.state
            .borrow()
            .queue
            .iter()
            .map(BitValue::bit_len)
            .sum()
    }

    /// Snapshots the queue and returns the transaction handle resolving it.
    pub fn begin_transaction(&self) -> Transaction {
        let depth = {
            let mut state = self.state.borrow_mut();
            let mark = Mark {
                queue_len: state.queue.len(),
                position: state.position,
            };
            state.marks.push(mark);
            state.marks.len()
        };

        let on_rollback = Rc::clone(&self.state);
        let on_commit = Rc::clone(&self.state);
        Transaction::new()
            .on_rollback(move || {
                let mut state = on_rollback.borrow_mut();
                state.marks.truncate(depth);
                if let Some(mark) = state.marks.pop() {
                    state.queue.truncate(mark.queue_len);
                    state.position = mark.position;
                }
                Ok(())
            })
            .on_commit(move || {
                let mut state = on_commit.borrow_mut();
                state.marks.truncate(depth);
                state.marks.pop();
                if state.marks.is_empty() {
                    state.flush()?;
                }
                Ok(())
            })
    }
}

impl DeferredState {
    fn flush(&mut self) -> Result<()> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let bits: u64 = self.queue.iter().map(BitValue::bit_len).sum();
        debug!(bits, values = self.queue.len(), "flushing deferred writes");
        for value in self.queue.drain(..) {
            self.sink.write(&value)?;
        }
        Ok(())
    }
}

impl BitSeek for DeferredBitWriter {
    fn position(&self) -> u64 {
        self.state.borrow().position
    }

    fn move_by(&mut self, offset: i64) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let target = state.position as i64 + offset;
        if target < 0 {
            return Err(super::StreamError::OutOfBounds {
                target,
                len: state.position,
            }
            .into());
        }
        state.position = target as u64;
        Ok(())
    }
}

impl BitWrite for DeferredBitWriter {
    fn write(&mut self, value: &BitValue) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.position += value.bit_len();
        state.queue.push(value.clone());
        Ok(())
    }
}

impl Clone for DeferredBitWriter {
    fn clone(&self) -> Self {
        Self {
            state: Rc::clone(&self.state),
        }
    }
}

impl std::fmt::Debug for DeferredBitWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("DeferredBitWriter")
            .field("queued", &state.queue.len())
            .field("open_marks", &state.marks.len())
            .field("position", &state.position)
            .finish()
    }
}
