//! In-memory bit streams.

use std::cell::RefCell;
use std::rc::Rc;

use crate::value::BitValue;
use crate::{Result, stream::StreamError};

use super::{BitRead, BitSeek, BitWrite};

/// A bit reader over an in-memory byte buffer, MSB-first.
#[derive(Debug, Clone)]
pub struct MemoryBitReader {
    data: Vec<u8>,
    bit_len: u64,
    position: u64,
}

impl MemoryBitReader {
    /// Creates a reader over whole bytes.
    pub fn from_bytes(data: Vec<u8>) -> Self {
        let bit_len = (data.len() as u64) * 8;
        Self {
            data,
            bit_len,
            position: 0,
        }
    }

    /// Creates a reader over the first `bit_len` bits of the buffer.
    ///
    /// Lets tests and callers model streams that end mid-byte.
    pub fn with_bit_len(data: Vec<u8>, bit_len: u64) -> Self {
        let bit_len = bit_len.min((data.len() as u64) * 8);
        Self {
            data,
            bit_len,
            position: 0,
        }
    }

    /// Total stream length in bits.
    pub fn bit_len(&self) -> u64 {
        self.bit_len
    }
}

impl BitSeek for MemoryBitReader {
    fn position(&self) -> u64 {
        self.position
    }

    fn move_by(&mut self, offset: i64) -> Result<()> {
        let target = self.position as i64 + offset;
        if target < 0 || target as u64 > self.bit_len {
            return Err(StreamError::OutOfBounds {
                target,
                len: self.bit_len,
            }
            .into());
        }
        self.position = target as u64;
        Ok(())
    }
}

impl BitRead for MemoryBitReader {
    fn read(&mut self, bits: u64) -> Result<BitValue> {
        if self.position + bits > self.bit_len {
            return Err(StreamError::PastEnd {
                position: self.position,
                requested: bits,
                len: self.bit_len,
            }
            .into());
        }
        let value = BitValue::from_bit_slice(&self.data, self.position, bits)?;
        self.position += bits;
        Ok(value)
    }
}

/// A bit writer into a growable in-memory buffer, MSB-first.
///
/// Handles are cheap clones over one shared buffer, so a caller can keep a
/// handle for inspection while the engine owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBitWriter {
    state: Rc<RefCell<WriterState>>,
}

#[derive(Debug, Default)]
struct WriterState {
    data: Vec<u8>,
    bit_len: u64,
    position: u64,
}

impl MemoryBitWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bits written so far (the high-water mark, not the cursor).
    pub fn bit_len(&self) -> u64 {
        self.state.borrow().bit_len
    }

    /// Copies the packed bytes out. Trailing bits of the last byte beyond
    /// [`Self::bit_len`] are zero.
    pub fn bytes(&self) -> Vec<u8> {
        self.state.borrow().data.clone()
    }
}

impl BitSeek for MemoryBitWriter {
    fn position(&self) -> u64 {
        self.state.borrow().position
    }

    fn move_by(&mut self, offset: i64) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let target = state.position as i64 + offset;
        if target < 0 || target as u64 > state.bit_len {
            return Err(StreamError::OutOfBounds {
                target,
                len: state.bit_len,
            }
            .into());
        }
        state.position = target as u64;
        Ok(())
    }
}

impl BitWrite for MemoryBitWriter {
    fn write(&mut self, value: &BitValue) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let end = state.position + value.bit_len();
        let needed = end.div_ceil(8) as usize;
        if state.data.len() < needed {
            state.data.resize(needed, 0);
        }
        for i in 0..value.bit_len() {
            let dst = state.position + i;
            let byte = (dst / 8) as usize;
            let mask = 1u8 << (7 - dst % 8);
            if value.bit(i) == 1 {
                state.data[byte] |= mask;
            } else {
                state.data[byte] &= !mask;
            }
        }
        state.position = end;
        state.bit_len = state.bit_len.max(end);
        Ok(())
    }
}
