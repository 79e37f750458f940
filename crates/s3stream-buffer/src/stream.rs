//! The driver-facing byte-stream surface shared by every variant.

use std::any::Any;
use std::error::Error as StdError;

use bytes::Bytes;
use serde::Serialize;

use s3stream_core::id::StreamId;
use s3stream_core::types::Whence;

use crate::error_cell::SharedError;
use crate::shared::StreamShared;

/// File-like surface a transfer engine drives from one side while the
/// application drives the other.
///
/// `read`, `seek`, `tell` and `prune` are required: each variant has its own
/// policy for them and there is no neutral default that could be mistaken for
/// a real end of stream.
pub trait ByteStream: Send + Sync {
    /// Append `chunk` and return its length. Never partial; backpressure only
    /// delays the return.
    fn write(&self, chunk: &[u8]) -> usize;

    /// Return up to `n` bytes from the cursor. Empty means nothing is available
    /// right now, or end of stream once closed or drained. `read(0)` returns
    /// empty at once without waiting on either gate.
    fn read(&self, n: usize) -> Bytes;

    /// Reposition and return the new position in this variant's coordinates.
    /// Positions saturate at the `i64` bounds.
    fn seek(&self, offset: i64, whence: Whence) -> i64;

    fn tell(&self) -> i64;

    /// Discard `amount` already-consumed bytes from the front of the window.
    fn prune(&self, amount: usize);

    /// Shared state, for the provided methods below.
    fn shared(&self) -> &StreamShared;

    /// Idempotent; releases blocked readers and writers.
    fn close(&self) {
        self.shared().close();
    }

    fn is_closed(&self) -> bool {
        self.shared().is_closed()
    }

    /// Every declared byte has been pruned.
    fn is_drained(&self) -> bool {
        self.shared().is_drained()
    }

    fn total_size(&self) -> u64 {
        self.shared().total_size()
    }

    fn capacity(&self) -> usize {
        self.shared().capacity()
    }

    fn buffered(&self) -> usize {
        self.shared().buffered()
    }

    fn processed(&self) -> u64 {
        self.shared().processed()
    }

    fn error(&self) -> Option<SharedError> {
        self.shared().error()
    }

    fn set_error<E>(&self, err: E) -> bool
    where
        E: StdError + Send + Sync + 'static,
        Self: Sized,
    {
        self.shared().set_error(err)
    }

    /// Record a type-erased payload; `false` if it does not carry an error.
    fn record_error(&self, payload: Box<dyn Any + Send>) -> bool {
        self.shared().record_error(payload)
    }

    fn stats(&self) -> StreamStats {
        self.shared().stats()
    }

    /// Iterate `read(size)` results until the first empty one, then close.
    fn chunks(&self, size: usize) -> Chunks<'_, Self>
    where
        Self: Sized,
    {
        Chunks {
            stream: self,
            size,
            done: false,
        }
    }
}

/// Iterator returned by [`ByteStream::chunks`].
pub struct Chunks<'a, S: ByteStream + ?Sized> {
    stream: &'a S,
    size: usize,
    done: bool,
}

impl<S: ByteStream + ?Sized> Iterator for Chunks<'_, S> {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.done {
            return None;
        }
        let chunk = self.stream.read(self.size);
        if chunk.is_empty() {
            self.done = true;
            self.stream.close();
            return None;
        }
        Some(chunk)
    }
}

/// Point-in-time snapshot of a stream, for logs and CLI summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamStats {
    pub id: StreamId,
    pub total_size: u64,
    pub capacity: usize,
    pub buffered: usize,
    pub cursor: i64,
    pub processed: u64,
    pub closed: bool,
    pub drained: bool,
    pub peak_buffered: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StreamingDownload;

    #[test]
    fn chunks_closes_after_last_read() {
        let s = StreamingDownload::with_capacity(5, 16).unwrap();
        s.write(b"hello");
        let parts: Vec<Bytes> = s.chunks(2).collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(&parts[2][..], b"o");
        assert!(s.is_closed());
    }

    #[test]
    fn stats_serialize_for_reports() {
        let s = StreamingDownload::with_capacity(8, 4).unwrap();
        s.write(b"abcdef");
        s.read(2);
        let json = serde_json::to_value(s.stats()).unwrap();
        assert_eq!(json["total_size"], 8);
        assert_eq!(json["capacity"], 4);
        assert_eq!(json["buffered"], 4);
        assert_eq!(json["processed"], 2);
        assert_eq!(json["peak_buffered"], 6);
        assert_eq!(json["closed"], false);
    }
}
