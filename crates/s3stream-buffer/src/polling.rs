//! Variant C: no condition variables, cooperative sleep-and-retry.
//!
//! For hosts that cannot park a thread on a condvar. A writer that finds the
//! window above capacity, or a reader that finds nothing to read on an open
//! stream, drops the lock, sleeps, and tries again with a linearly growing
//! delay (see [`Backoff`]). There is no retry limit.
//!
//! Reads prune what they return, and a prune that drains the stream closes it.
//! Coordinates are window-relative, as for [`StreamingDownload`](crate::StreamingDownload).
//!
//! The shared core still notifies its condvars on writes and prunes; nothing
//! parks on them here, so those notifies are no-ops.

use std::fmt;
use std::thread;

use bytes::Bytes;

use s3stream_core::config::{BackoffConfig, StreamConfig};
use s3stream_core::types::Whence;

use crate::backoff::Backoff;
use crate::error::Result;
use crate::shared::StreamShared;
use crate::stream::ByteStream;
use crate::window::Window;

pub struct PollingStream {
    shared: StreamShared,
    backoff: BackoffConfig,
}

impl PollingStream {
    /// Stream of `total_size` bytes with the default buffer and backoff.
    pub fn new(total_size: u64) -> Result<Self> {
        Self::with_config(total_size, &StreamConfig::default())
    }

    pub fn with_capacity(total_size: u64, buffer_size: usize) -> Result<Self> {
        Self::with_config(total_size, &StreamConfig::with_buffer_size(buffer_size))
    }

    pub fn with_config(total_size: u64, cfg: &StreamConfig) -> Result<Self> {
        Ok(Self {
            shared: StreamShared::new(total_size, cfg)?,
            backoff: cfg.backoff(),
        })
    }

    fn prune_locked(&self, w: &mut Window, amount: usize) {
        let outcome = self.shared.prune_locked(w, amount);
        if outcome.drained && w.close() {
            debug_event!(stream = %self.shared.id(), "drained stream auto-closed");
        }
    }
}

impl ByteStream for PollingStream {
    fn write(&self, chunk: &[u8]) -> usize {
        let mut backoff = Backoff::new(self.backoff);
        loop {
            {
                let mut w = self.shared.lock();
                if w.is_closed() || w.len() <= self.shared.capacity() {
                    self.shared.append_locked(&mut w, chunk);
                    return chunk.len();
                }
            }
            let delay = backoff.next_delay();
            trace_event!(
                stream = %self.shared.id(),
                attempt = backoff.attempts(),
                delay_ms = delay.as_millis() as u64,
                "write polling for room"
            );
            thread::sleep(delay);
        }
    }

    fn read(&self, n: usize) -> Bytes {
        if n == 0 {
            return Bytes::new();
        }
        let mut backoff = Backoff::new(self.backoff);
        loop {
            {
                let mut w = self.shared.lock();
                let out = w.take(n);
                if !out.is_empty() {
                    self.prune_locked(&mut w, out.len());
                    return out;
                }
                if w.is_closed() || w.is_drained() {
                    return Bytes::new();
                }
            }
            let delay = backoff.next_delay();
            trace_event!(
                stream = %self.shared.id(),
                attempt = backoff.attempts(),
                delay_ms = delay.as_millis() as u64,
                "read polling for data"
            );
            thread::sleep(delay);
        }
    }

    fn seek(&self, offset: i64, whence: Whence) -> i64 {
        self.shared.seek_cursor(offset, whence)
    }

    fn tell(&self) -> i64 {
        self.shared.cursor()
    }

    fn prune(&self, amount: usize) {
        let mut w = self.shared.lock();
        self.prune_locked(&mut w, amount);
    }

    fn shared(&self) -> &StreamShared {
        &self.shared
    }
}

impl fmt::Debug for PollingStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.shared.describe(f, "PollingStream")
    }
}
