#![forbid(unsafe_code)]
//! s3stream-buffer: bounded, flow-controlled byte streams.
//!
//! A stream sits between a producer and a consumer that run on different
//! threads, typically a transfer engine on one side and application code on
//! the other. Every variant keeps a window of the logical stream in memory,
//! guarded by a single mutex, and applies backpressure so the window does not
//! grow past the configured buffer size.
//!
//! Three policies are provided:
//! - [`StreamingDownload`]: condvar-gated, the consumer prunes on read.
//! - [`StreamingUpload`]: condvar-gated, the driver prunes via a progress callback.
//! - [`PollingStream`]: no blocking primitives, sleep-and-retry with linear backoff.
//!
//! Invariant shared by all of them: no lock guard is held across a sleep, and
//! condvar waits always release the lock.

#[macro_use]
mod macros;

pub mod backoff;
pub mod download;
pub mod error;
pub mod error_cell;
pub mod io;
pub mod polling;
pub mod shared;
pub mod stream;
pub mod tracking;
pub mod upload;
mod window;

pub use backoff::Backoff;
pub use download::StreamingDownload;
pub use error::{Error, Result};
pub use error_cell::{ErrorCell, SharedError};
pub use io::IoStream;
pub use polling::PollingStream;
pub use shared::StreamShared;
pub use stream::{ByteStream, Chunks, StreamStats};
pub use tracking::PeakTracker;
pub use upload::StreamingUpload;

pub use s3stream_core::types::Whence;
