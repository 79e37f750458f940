//! Linear backoff for polling waits.
//!
//! Each wait step sleeps for the current delay, then grows it by a fixed step
//! up to a cap. There is no retry limit: the caller keeps polling until the
//! other side makes progress or closes the stream.

use std::time::Duration;

use s3stream_core::config::BackoffConfig;

#[derive(Debug, Clone)]
pub struct Backoff {
    cfg: BackoffConfig,
    next: Duration,
    attempts: u32,
}

impl Backoff {
    pub fn new(cfg: BackoffConfig) -> Self {
        Self {
            next: cfg.initial_delay.min(cfg.max_delay),
            cfg,
            attempts: 0,
        }
    }

    /// Return the delay to sleep now and grow the next one.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = std::cmp::min(self.next + self.cfg.step, self.cfg.max_delay);
        self.attempts = self.attempts.saturating_add(1);
        delay
    }

    /// Number of delays handed out so far.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(initial: u64, step: u64, max: u64) -> BackoffConfig {
        BackoffConfig {
            initial_delay: Duration::from_millis(initial),
            step: Duration::from_millis(step),
            max_delay: Duration::from_millis(max),
        }
    }

    #[test]
    fn grows_linearly_then_clamps() {
        let mut b = Backoff::new(cfg(10, 20, 45));
        let delays: Vec<u64> = (0..5).map(|_| b.next_delay().as_millis() as u64).collect();
        assert_eq!(delays, vec![10, 30, 45, 45, 45]);
        assert_eq!(b.attempts(), 5);
    }

    #[test]
    fn initial_above_max_is_clamped() {
        let mut b = Backoff::new(cfg(100, 1, 5));
        assert_eq!(b.next_delay(), Duration::from_millis(5));
    }
}
