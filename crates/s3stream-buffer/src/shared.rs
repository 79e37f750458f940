//! State shared by every variant: the mutex-guarded window plus the two gates.
//!
//! The gates are condition variables paired with flags that live inside the
//! window, so a flag is always updated under the same lock as the bytes it
//! describes. `Condvar::wait` releases the lock while parked; nothing in here
//! sleeps with a guard held.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use parking_lot::{Condvar, Mutex, MutexGuard};

use s3stream_core::config::StreamConfig;
use s3stream_core::id::StreamId;
use s3stream_core::types::Whence;

use crate::error::Result;
use crate::error_cell::SharedError;
use crate::stream::StreamStats;
use crate::tracking::PeakTracker;
use crate::window::{PruneOutcome, Window};

pub struct StreamShared {
    id: StreamId,
    total_size: u64,
    capacity: usize,
    state: Mutex<Window>,
    /// Producer gate: signalled when the window drops below capacity.
    room: Condvar,
    /// Consumer gate: signalled on writes, close, and the final drain.
    data: Condvar,
    peak: PeakTracker,
}

impl StreamShared {
    pub(crate) fn new(total_size: u64, cfg: &StreamConfig) -> Result<Self> {
        cfg.validate()?;
        let id = StreamId::next();
        debug_event!(stream = %id, total_size, capacity = cfg.buffer_size, "stream created");
        Ok(Self {
            id,
            total_size,
            capacity: cfg.buffer_size,
            state: Mutex::new(Window::new(total_size, cfg.buffer_size)),
            room: Condvar::new(),
            data: Condvar::new(),
            peak: PeakTracker::new(),
        })
    }

    pub fn id(&self) -> StreamId {
        self.id
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, Window> {
        self.state.lock()
    }

    /// Block until the room gate is open, then append under the same guard.
    pub(crate) fn write_gated(&self, chunk: &[u8]) -> usize {
        let mut w = self.state.lock();
        if !w.room_available() {
            debug_event!(stream = %self.id, buffered = w.len(), "write waiting for room");
            while !w.room_available() {
                self.room.wait(&mut w);
            }
            trace_event!(stream = %self.id, buffered = w.len(), "write resumed");
        }
        self.append_locked(&mut w, chunk);
        chunk.len()
    }

    pub(crate) fn append_locked(&self, w: &mut Window, chunk: &[u8]) {
        let room_closed = w.append(chunk);
        self.peak.record(w.len());
        self.data.notify_all();
        trace_event!(
            stream = %self.id,
            bytes = chunk.len(),
            buffered = w.len(),
            room_closed,
            "write"
        );
    }

    /// Block until the data gate is open and hand back the guard.
    pub(crate) fn wait_data(&self) -> MutexGuard<'_, Window> {
        let mut w = self.state.lock();
        while !w.data_available() {
            self.data.wait(&mut w);
        }
        w
    }

    pub(crate) fn prune_locked(&self, w: &mut Window, amount: usize) -> PruneOutcome {
        let was_drained = w.is_drained();
        let outcome = w.prune(amount);
        if outcome.room_available {
            self.room.notify_all();
        }
        if outcome.data_available {
            self.data.notify_all();
        }
        trace_event!(
            stream = %self.id,
            removed = outcome.removed,
            processed = w.processed(),
            buffered = w.len(),
            "prune"
        );
        if outcome.drained && !was_drained {
            debug_event!(stream = %self.id, processed = w.processed(), "stream drained");
        }
        outcome
    }

    pub(crate) fn prune_gated(&self, amount: usize) -> PruneOutcome {
        let mut w = self.state.lock();
        self.prune_locked(&mut w, amount)
    }

    /// `total_size + offset`, saturating at the `i64` bounds.
    pub(crate) fn end_position(&self, offset: i64) -> i64 {
        i64::try_from(self.total_size)
            .unwrap_or(i64::MAX)
            .saturating_add(offset)
    }

    /// Reposition the window-relative cursor and return it. Positions
    /// saturate instead of overflowing.
    pub(crate) fn seek_cursor(&self, offset: i64, whence: Whence) -> i64 {
        let mut w = self.state.lock();
        let pos = match whence {
            Whence::Start => offset,
            Whence::Current => w.cursor().saturating_add(offset),
            Whence::End => self.end_position(offset),
        };
        w.set_cursor(pos);
        pos
    }

    pub(crate) fn cursor(&self) -> i64 {
        self.state.lock().cursor()
    }

    /// Idempotent. Releases every reader and writer parked on either gate.
    pub fn close(&self) {
        let mut w = self.state.lock();
        if w.close() {
            debug_event!(
                stream = %self.id,
                processed = w.processed(),
                buffered = w.len(),
                "stream closed"
            );
        }
        self.room.notify_all();
        self.data.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().is_closed()
    }

    pub fn is_drained(&self) -> bool {
        self.state.lock().is_drained()
    }

    pub fn buffered(&self) -> usize {
        self.state.lock().len()
    }

    pub fn processed(&self) -> u64 {
        self.state.lock().processed()
    }

    pub fn peak_buffered(&self) -> usize {
        self.peak.peak()
    }

    pub fn error(&self) -> Option<SharedError> {
        self.state.lock().error.get()
    }

    pub fn set_error<E>(&self, err: E) -> bool
    where
        E: StdError + Send + Sync + 'static,
    {
        debug_event!(stream = %self.id, error = %err, "error recorded");
        self.state.lock().error.set(err)
    }

    pub fn record_error(&self, payload: Box<dyn Any + Send>) -> bool {
        let accepted = self.state.lock().error.record(payload);
        if !accepted {
            debug_event!(stream = %self.id, "rejected non-error payload");
        }
        accepted
    }

    pub fn stats(&self) -> StreamStats {
        let w = self.state.lock();
        StreamStats {
            id: self.id,
            total_size: self.total_size,
            capacity: self.capacity,
            buffered: w.len(),
            cursor: w.cursor(),
            processed: w.processed(),
            closed: w.is_closed(),
            drained: w.is_drained(),
            peak_buffered: self.peak.peak(),
        }
    }

    /// `Name(total_size, buffer_size=capacity)`
    pub(crate) fn describe(&self, f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
        write!(
            f,
            "{}({}, buffer_size={})",
            name, self.total_size, self.capacity
        )
    }
}
