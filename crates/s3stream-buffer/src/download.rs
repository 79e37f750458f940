//! Variant A: condvar-gated in both directions, consumer prunes itself.
//!
//! The application reads what a transfer engine writes. Every non-empty read
//! prunes exactly what it returned, so the window only holds unread bytes and
//! the cursor normally sits at 0. Do not also wire `prune` as a progress
//! callback; that would discard unread data.
//!
//! Coordinates are window-relative: `seek` moves the cursor, `tell` reports it.
//! An engine that seeks to absolute stream offsets before writing moves the
//! read cursor with it; only seek here when repositioning the reader.

use std::fmt;

use bytes::Bytes;

use s3stream_core::config::StreamConfig;
use s3stream_core::types::Whence;

use crate::error::Result;
use crate::shared::StreamShared;
use crate::stream::ByteStream;

pub struct StreamingDownload {
    shared: StreamShared,
}

impl StreamingDownload {
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
}

impl ByteStream for StreamingDownload {
    fn write(&self, chunk: &[u8]) -> usize {
        self.shared.write_gated(chunk)
    }

    fn read(&self, n: usize) -> Bytes {
        if n == 0 {
            return Bytes::new();
        }
        let mut w = self.shared.wait_data();
        let out = w.take(n);
        if !out.is_empty() {
            self.shared.prune_locked(&mut w, out.len());
        }
        out
    }

    fn seek(&self, offset: i64, whence: Whence) -> i64 {
        self.shared.seek_cursor(offset, whence)
    }

    fn tell(&self) -> i64 {
        self.shared.cursor()
    }

    fn prune(&self, amount: usize) {
        self.shared.prune_gated(amount);
    }

    fn shared(&self) -> &StreamShared {
        &self.shared
    }
}

impl fmt::Debug for StreamingDownload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.shared.describe(f, "StreamingDownload")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_prunes_what_it_returns() {
        let s = StreamingDownload::with_capacity(6, 16).unwrap();
        s.write(b"abcdef");
        assert_eq!(&s.read(4)[..], b"abcd");
        assert_eq!(s.processed(), 4);
        assert_eq!(s.buffered(), 2);
        assert_eq!(s.tell(), 0);
    }

    #[test]
    fn drained_stream_reads_empty_without_closing() {
        let s = StreamingDownload::with_capacity(3, 16).unwrap();
        s.write(b"xyz");
        assert_eq!(&s.read(10)[..], b"xyz");
        assert!(s.is_drained());
        assert!(!s.is_closed());
        assert!(s.read(10).is_empty());
        assert!(s.read(10).is_empty());
    }

    #[test]
    fn seek_is_window_relative() {
        let s = StreamingDownload::with_capacity(10, 16).unwrap();
        s.write(b"abcd");
        assert_eq!(s.seek(2, Whence::Start), 2);
        assert_eq!(s.tell(), 2);
        assert_eq!(s.seek(1, Whence::Current), 3);
        assert_eq!(s.seek(-4, Whence::End), 6);
        assert_eq!(s.seek(0, Whence::Start), 0);
        assert_eq!(s.tell(), 0);
    }

    #[test]
    fn debug_shows_sizes() {
        let s = StreamingDownload::with_capacity(10, 4).unwrap();
        assert_eq!(format!("{s:?}"), "StreamingDownload(10, buffer_size=4)");
    }

    #[test]
    fn zero_capacity_is_a_config_error() {
        assert!(StreamingDownload::with_capacity(10, 0).is_err());
    }

    #[test]
    fn zero_length_read_skips_data_gate() {
        // Nothing written yet, so a sized read would park here.
        let s = StreamingDownload::with_capacity(10, 16).unwrap();
        assert!(s.read(0).is_empty());
        s.write(b"ab");
        assert!(s.read(0).is_empty());
        assert_eq!(s.processed(), 0);
    }

    #[test]
    fn seek_saturates_instead_of_overflowing() {
        let s = StreamingDownload::with_capacity(10, 16).unwrap();
        s.write(b"abcd");
        assert_eq!(s.seek(1, Whence::Start), 1);
        assert_eq!(s.seek(i64::MAX, Whence::Current), i64::MAX);
        assert_eq!(s.seek(i64::MIN, Whence::End), i64::MIN + 10);
        assert_eq!(s.seek(i64::MIN, Whence::Current), i64::MIN);
        assert!(s.read(4).is_empty());
        s.prune(4);
        assert_eq!(s.tell(), i64::MIN);
    }
}
