#![forbid(unsafe_code)]
//! s3stream-core: shared types for flow-controlled byte streams.
//!
//! Holds the configuration, error type, seek reference points and stream
//! identifiers. No threads or I/O live here; the buffer implementations are in
//! `s3stream-buffer`.

pub mod config;
pub mod error;
pub mod id;
pub mod prelude;
pub mod types;
