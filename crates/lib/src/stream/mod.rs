//! Bit-addressed stream contracts and reference implementations.
//!
//! The engine never touches binary data directly; it goes through the three
//! cursor contracts here. [`BitSeek`] exposes a bit position and relative
//! moves, [`BitRead`] adds bit-granular reads, [`BitWrite`] bit-granular
//! writes. Positions count bits from the stream origin with no alignment
//! assumption.
//!
//! [`MemoryBitReader`] and [`MemoryBitWriter`] are the in-memory reference
//! implementations. [`DeferredBitWriter`] is the transactional adapter the
//! encoding context stacks on top of any [`BitWrite`]: writes queue up and
//! reach the underlying sink only when the outermost transaction commits.

mod errors;
pub use errors::StreamError;

mod deferred;
pub use deferred::DeferredBitWriter;

mod memory;
pub use memory::{MemoryBitReader, MemoryBitWriter};

use crate::{BitValue, Result};

/// A bit-granular cursor over a stream.
pub trait BitSeek {
    /// Current position in bits from the stream origin.
    fn position(&self) -> u64;

    /// Moves the cursor by `offset` bits; positive offsets move forward.
    fn move_by(&mut self, offset: i64) -> Result<()>;
}

/// A bit-granular reader.
pub trait BitRead: BitSeek {
    /// Reads `bits` bits at the cursor and advances past them.
    fn read(&mut self, bits: u64) -> Result<BitValue>;
}

/// A bit-granular writer.
pub trait BitWrite: BitSeek {
    /// Writes a bit value at the cursor and advances past it.
    fn write(&mut self, value: &BitValue) -> Result<()>;
}
