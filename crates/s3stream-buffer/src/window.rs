//! The in-memory window and its gate flags.
//!
//! `Window` is plain data: every method here runs under the stream mutex and
//! never blocks. Waiting and notification live in `shared`.

use bytes::{Buf, Bytes, BytesMut};

use crate::error_cell::ErrorCell;

/// Result of a prune, reported so callers can notify the right waiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PruneOutcome {
    pub removed: usize,
    pub room_available: bool,
    pub data_available: bool,
    pub drained: bool,
}

pub(crate) struct Window {
    bytes: BytesMut,
    /// Read position relative to `bytes[0]`. Signed: pruning ahead of reads or
    /// seeking before the window can push it out of range for a while.
    cursor: i64,
    /// Stream offset of `bytes[0]`.
    processed: u64,
    total_size: u64,
    capacity: usize,
    closed: bool,
    room_available: bool,
    data_available: bool,
    pub(crate) error: ErrorCell,
}

impl Window {
    pub fn new(total_size: u64, capacity: usize) -> Self {
        Self {
            bytes: BytesMut::new(),
            cursor: 0,
            processed: 0,
            total_size,
            capacity,
            closed: false,
            room_available: true,
            // An empty stream is drained from the start; let the first read see EOF.
            data_available: total_size == 0,
            error: ErrorCell::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: i64) {
        self.cursor = cursor;
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_drained(&self) -> bool {
        self.processed >= self.total_size
    }

    pub fn room_available(&self) -> bool {
        self.room_available
    }

    pub fn data_available(&self) -> bool {
        self.data_available
    }

    /// Stream offset one past the last buffered byte.
    pub fn end_offset(&self) -> i64 {
        (self.processed + self.bytes.len() as u64) as i64
    }

    /// Append a chunk. Returns `true` if this write closed the room gate.
    pub fn append(&mut self, chunk: &[u8]) -> bool {
        self.bytes.extend_from_slice(chunk);
        self.data_available = true;
        if !self.closed && self.bytes.len() >= self.capacity {
            self.room_available = false;
            return true;
        }
        false
    }

    /// Copy out up to `n` bytes starting at the cursor and advance it.
    ///
    /// A cursor outside the window yields an empty result and stays put.
    pub fn take(&mut self, n: usize) -> Bytes {
        if self.cursor < 0 {
            return Bytes::new();
        }
        let start = self.cursor as usize;
        if start >= self.bytes.len() {
            return Bytes::new();
        }
        let amount = n.min(self.bytes.len() - start);
        let out = Bytes::copy_from_slice(&self.bytes[start..start + amount]);
        self.cursor += amount as i64;
        out
    }

    /// Drop the first `amount` bytes (clamped to the window) and re-evaluate both gates.
    pub fn prune(&mut self, amount: usize) -> PruneOutcome {
        let removed = amount.min(self.bytes.len());
        self.bytes.advance(removed);
        // Release the old allocation once the window empties out.
        if self.bytes.is_empty() {
            self.bytes = BytesMut::new();
        }
        self.cursor = self.cursor.saturating_sub(removed as i64);
        self.processed += removed as u64;

        if self.closed {
            self.room_available = true;
            self.data_available = true;
        } else {
            self.room_available = self.bytes.len() < self.capacity;
            if self.bytes.is_empty() {
                // Drained: keep data open so the final empty read becomes EOF.
                // Otherwise the window is only temporarily empty.
                self.data_available = self.is_drained();
            }
        }

        PruneOutcome {
            removed,
            room_available: self.room_available,
            data_available: self.data_available,
            drained: self.is_drained(),
        }
    }

    /// Mark closed and force both gates open. Returns `false` if it was already closed.
    pub fn close(&mut self) -> bool {
        let first = !self.closed;
        self.closed = true;
        self.room_available = true;
        self.data_available = true;
        first
    }
}
