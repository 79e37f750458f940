#![forbid(unsafe_code)]
//! s3stream: flow-controlled in-memory byte streams.
//!
//! Facade over the workspace crates. See `s3stream-buffer` for the stream
//! variants and `s3stream-core` for configuration and shared types.

pub use s3stream_buffer::{
    Backoff, ByteStream, Chunks, Error, ErrorCell, IoStream, PeakTracker, PollingStream, Result,
    SharedError, StreamShared, StreamStats, StreamingDownload, StreamingUpload,
};
pub use s3stream_core::config::{BackoffConfig, StreamConfig, DEFAULT_BUFFER_SIZE};
pub use s3stream_core::id::StreamId;
pub use s3stream_core::types::{Variant, Whence};

