//! Variant B: condvar-gated, pruning driven by an external progress callback.
//!
//! The application writes; a transfer engine reads and reports progress by
//! calling [`StreamingUpload::prune`] (or the closure from
//! [`StreamingUpload::progress_callback`]) with the number of bytes it has
//! finished with. `read` itself never prunes.
//!
//! Coordinates are stream-absolute: `seek` computes a position from
//! `processed + buffered` without moving the cursor, and `tell` is
//! `seek(0, Whence::Current)`.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use s3stream_core::config::StreamConfig;
use s3stream_core::types::Whence;

use crate::error::Result;
use crate::shared::StreamShared;
use crate::stream::ByteStream;

pub struct StreamingUpload {
    shared: StreamShared,
}

impl StreamingUpload {
    /// Stream of `total_size` bytes with the default 8 MiB buffer.
    pub fn new(total_size: u64) -> Result<Self> {
        Self::with_config(total_size, &StreamConfig::default())
    }

    pub fn with_capacity(total_size: u64, buffer_size: usize) -> Result<Self> {
        Self::with_config(total_size, &StreamConfig::with_buffer_size(buffer_size))
    }

    pub fn with_config(total_size: u64, cfg: &StreamConfig) -> Result<Self> {
        Ok(Self {
            shared: StreamShared::new(total_size, cfg)?,
        })
    }

    /// Closure suitable for an engine's "bytes transferred" hook.
    pub fn progress_callback(self: &Arc<Self>) -> impl Fn(usize) + Send + Sync + 'static {
        let stream = Arc::clone(self);
        move |amount| stream.prune(amount)
    }
}

impl ByteStream for StreamingUpload {
    fn write(&self, chunk: &[u8]) -> usize {
        self.shared.write_gated(chunk)
    }

    fn read(&self, n: usize) -> Bytes {
        if n == 0 {
            return Bytes::new();
        }
        let mut w = self.shared.wait_data();
        w.take(n)
    }

    fn seek(&self, offset: i64, whence: Whence) -> i64 {
        match whence {
            Whence::Start => offset,
            Whence::Current => self.shared.lock().end_offset().saturating_add(offset),
            Whence::End => self.shared.end_position(offset),
        }
    }

    fn tell(&self) -> i64 {
        self.seek(0, Whence::Current)
    }

    fn prune(&self, amount: usize) {
        self.shared.prune_gated(amount);
    }

    fn shared(&self) -> &StreamShared {
        &self.shared
    }
}

impl fmt::Debug for StreamingUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.shared.describe(f, "StreamingUpload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_does_not_prune() {
        let s = StreamingUpload::with_capacity(6, 16).unwrap();
        s.write(b"abcdef");
        assert_eq!(&s.read(4)[..], b"abcd");
        assert_eq!(s.processed(), 0);
        assert_eq!(s.buffered(), 6);

        s.prune(4);
        assert_eq!(s.processed(), 4);
        assert_eq!(&s.read(4)[..], b"ef");
    }

    #[test]
    fn seek_is_stream_absolute_and_does_not_move_cursor() {
        let s = StreamingUpload::with_capacity(10, 16).unwrap();
        s.write(b"abcdef");
        s.read(3);
        s.prune(3);

        assert_eq!(s.seek(0, Whence::Start), 0);
        assert_eq!(s.seek(0, Whence::Current), 6);
        assert_eq!(s.seek(-2, Whence::Current), 4);
        assert_eq!(s.seek(-3, Whence::End), 7);
        assert_eq!(s.tell(), 6);

        // Cursor untouched by any of the seeks above.
        assert_eq!(&s.read(10)[..], b"def");
    }

    #[test]
    fn progress_callback_prunes() {
        let s = Arc::new(StreamingUpload::with_capacity(4, 16).unwrap());
        let callback = s.progress_callback();
        s.write(b"abcd");
        s.read(4);
        callback(4);
        assert!(s.is_drained());
        assert!(s.read(4).is_empty());
    }

    #[test]
    fn debug_shows_sizes() {
        let s = StreamingUpload::with_capacity(10, 4).unwrap();
        assert_eq!(format!("{s:?}"), "StreamingUpload(10, buffer_size=4)");
    }

    #[test]
    fn zero_length_read_skips_data_gate() {
        let s = StreamingUpload::with_capacity(10, 16).unwrap();
        assert!(s.read(0).is_empty());
    }

    #[test]
    fn seek_saturates_instead_of_overflowing() {
        let s = StreamingUpload::with_capacity(10, 16).unwrap();
        s.write(b"abc");
        assert_eq!(s.seek(i64::MAX, Whence::Current), i64::MAX);
        assert_eq!(s.seek(i64::MAX, Whence::End), i64::MAX);
        assert_eq!(s.seek(i64::MIN, Whence::End), i64::MIN + 10);
        assert_eq!(s.tell(), 3);
    }
}
