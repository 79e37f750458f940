//! Convenient re-exports for downstream crates.

pub use crate::config::StreamConfig;
pub use crate::error::{Error, Result};
pub use crate::id::StreamId;
pub use crate::types::{Variant, Whence};
