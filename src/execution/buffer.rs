//! Capped output accumulation.

use crate::error::ProcessError;
use crate::Result;

/// Hard ceiling on captured output per call (1 MiB).
pub const MAX_OUTPUT_SIZE: usize = 1024 * 1024;

/// Capacity a fresh buffer starts with.
pub const INITIAL_CAPACITY: usize = 4096;

/// Size of each read from the pipe.
pub const READ_CHUNK_SIZE: usize = 4096;

/// What happened to a pushed chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    /// The bytes were stored.
    Stored,
    /// The cap was reached; the bytes were dropped.
    Discarded,
}

/// Growable byte accumulator bounded by [`MAX_OUTPUT_SIZE`].
///
/// One byte of capacity stays reserved for a terminator, so the buffer
/// holds at most `MAX_OUTPUT_SIZE - 1` bytes. Once a chunk no longer fits
/// the buffer is sealed and every later chunk is discarded.
#[derive(Debug)]
pub struct OutputBuffer {
    bytes: Vec<u8>,
    capacity: usize,
    truncated: bool,
}

impl OutputBuffer {
    /// Allocate a buffer with the initial capacity.
    ///
    /// Fails with [`ProcessError::OutOfMemory`] if the allocation fails.
    pub fn new() -> Result<Self> {
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(INITIAL_CAPACITY)
            .map_err(|_| ProcessError::OutOfMemory)?;
        Ok(Self {
            bytes,
            capacity: INITIAL_CAPACITY,
            truncated: false,
        })
    }

    /// Append a chunk, doubling the capacity when needed.
    ///
    /// Returns `Err(OutOfMemory)` if growing fails; the buffer is sealed
    /// and keeps what it already holds.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Append> {
        if self.truncated {
            return Ok(Append::Discarded);
        }

        let needed = self.bytes.len() + chunk.len();
        if needed >= self.capacity {
            let new_capacity = (self.capacity * 2).min(MAX_OUTPUT_SIZE);
            if needed >= new_capacity {
                self.truncated = true;
                return Ok(Append::Discarded);
            }
            if self
                .bytes
                .try_reserve_exact(new_capacity - self.bytes.len())
                .is_err()
            {
                self.truncated = true;
                return Err(ProcessError::OutOfMemory);
            }
            self.capacity = new_capacity;
        }

        self.bytes.extend_from_slice(chunk);
        Ok(Append::Stored)
    }

    /// Largest chunk the buffer could still accept.
    pub fn room(&self) -> usize {
        if self.truncated {
            0
        } else {
            MAX_OUTPUT_SIZE - 1 - self.bytes.len()
        }
    }

    /// Current logical capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether any bytes were dropped.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}
