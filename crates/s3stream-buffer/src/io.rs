//! `std::io` adapter so a stream can be handed to code that expects a file.

use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use s3stream_core::types::Whence;

use crate::stream::ByteStream;

/// Owns an `Arc` to a stream and exposes it through `Read`, `Write` and `Seek`.
///
/// `read` returning `Ok(0)` means end of stream, exactly as an empty
/// [`ByteStream::read`] does. A seek that lands on a negative position is
/// still applied to the stream but reported as `InvalidInput`, since
/// `io::Seek` cannot represent it.
pub struct IoStream<S: ByteStream> {
    inner: Arc<S>,
}

impl<S: ByteStream> IoStream<S> {
    pub fn new(inner: Arc<S>) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &Arc<S> {
        &self.inner
    }

    pub fn into_inner(self) -> Arc<S> {
        self.inner
    }
}

impl<S: ByteStream> Clone for IoStream<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ByteStream> Read for IoStream<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let chunk = self.inner.read(buf.len());
        buf[..chunk.len()].copy_from_slice(&chunk);
        Ok(chunk.len())
    }
}

impl<S: ByteStream> Write for IoStream<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.inner.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: ByteStream> Seek for IoStream<S> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, whence) = match pos {
            SeekFrom::Start(off) => {
                let off = i64::try_from(off).map_err(|_| {
                    io::Error::new(io::ErrorKind::InvalidInput, "seek offset overflows i64")
                })?;
                (off, Whence::Start)
            }
            SeekFrom::Current(off) => (off, Whence::Current),
            SeekFrom::End(off) => (off, Whence::End),
        };
        let new_pos = self.inner.seek(offset, whence);
        u64::try_from(new_pos).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("seek to negative position {new_pos}"),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StreamingDownload;

    #[test]
    fn read_to_end_stops_at_drain() {
        let s = Arc::new(StreamingDownload::with_capacity(5, 16).unwrap());
        s.write(b"hello");
        let mut io = IoStream::new(Arc::clone(&s));
        let mut out = Vec::new();
        io.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn negative_seek_is_invalid_input() {
        let s = Arc::new(StreamingDownload::with_capacity(5, 16).unwrap());
        let mut io = IoStream::new(s);
        let err = io.seek(SeekFrom::End(-10)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(io.seek(SeekFrom::End(-2)).unwrap(), 3);
    }

    #[test]
    fn huge_relative_seek_does_not_panic() {
        let s = Arc::new(StreamingDownload::with_capacity(5, 16).unwrap());
        let mut io = IoStream::new(s);
        assert_eq!(io.seek(SeekFrom::Start(1)).unwrap(), 1);
        assert_eq!(io.seek(SeekFrom::Current(i64::MAX)).unwrap(), i64::MAX as u64);
        let err = io.seek(SeekFrom::End(i64::MIN)).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn empty_buffer_read_returns_zero_on_open_stream() {
        let s = Arc::new(crate::PollingStream::with_capacity(10, 16).unwrap());
        s.write(b"abc");
        let mut io = IoStream::new(Arc::clone(&s));
        let mut empty = [0u8; 0];
        assert_eq!(io.read(&mut empty).unwrap(), 0);
        assert_eq!(s.buffered(), 3);
    }
}
