//! Stream configuration that drivers can serialize/deserialize.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default soft ceiling on buffered bytes (8 MiB).
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Soft ceiling on bytes held in memory. Advisory for backpressure; a
    /// single write larger than this is still accepted whole.
    pub buffer_size: usize,

    /// First sleep of a polling wait.
    pub poll_initial_delay_ms: u64,

    /// Added to the delay after every unsuccessful poll.
    pub poll_step_ms: u64,

    /// Upper bound for a single polling sleep.
    pub poll_max_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            poll_initial_delay_ms: 1,
            poll_step_ms: 5,
            poll_max_delay_ms: 100,
        }
    }
}

/// Linear backoff parameters for polling waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffConfig {
    pub initial_delay: Duration,
    pub step: Duration,
    pub max_delay: Duration,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        StreamConfig::default().backoff()
    }
}

impl StreamConfig {
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size,
            ..Self::default()
        }
    }

    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `S3STREAM_BUFFER_SIZE`: buffer ceiling in bytes
    /// - `S3STREAM_POLL_INITIAL_MS`: first polling sleep
    /// - `S3STREAM_POLL_STEP_MS`: polling delay increment
    /// - `S3STREAM_POLL_MAX_MS`: polling delay cap
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("S3STREAM_BUFFER_SIZE") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.buffer_size = v;
            }
        }

        if let Ok(s) = std::env::var("S3STREAM_POLL_INITIAL_MS") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.poll_initial_delay_ms = v;
            }
        }

        if let Ok(s) = std::env::var("S3STREAM_POLL_STEP_MS") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.poll_step_ms = v;
            }
        }

        if let Ok(s) = std::env::var("S3STREAM_POLL_MAX_MS") {
            if let Ok(v) = s.parse::<u64>() {
                cfg.poll_max_delay_ms = v;
            }
        }

        cfg
    }

    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer_size must be greater than zero".into()));
        }
        if self.poll_initial_delay_ms > self.poll_max_delay_ms {
            return Err(Error::Config(format!(
                "poll_initial_delay_ms ({}) exceeds poll_max_delay_ms ({})",
                self.poll_initial_delay_ms, self.poll_max_delay_ms
            )));
        }
        if self.poll_max_delay_ms == 0 {
            return Err(Error::Config(
                "poll_max_delay_ms must be greater than zero; polling would spin".into(),
            ));
        }
        Ok(())
    }

    /// Backoff snapshot used by the polling variant.
    pub fn backoff(&self) -> BackoffConfig {
        BackoffConfig {
            initial_delay: Duration::from_millis(self.poll_initial_delay_ms),
            step: Duration::from_millis(self.poll_step_ms),
            max_delay: Duration::from_millis(self.poll_max_delay_ms),
        }
    }
}
