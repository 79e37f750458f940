//! High-water mark tracking for buffered bytes.
//!
//! Readable without taking the stream lock, so stats polling from a
//! monitoring thread never contends with the producer or consumer.

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default, Debug)]
pub struct PeakTracker {
    peak_bytes: AtomicUsize,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self {
            peak_bytes: AtomicUsize::new(0),
        }
    }

    /// Record a new "buffered bytes" value; updates peak if higher.
    pub fn record(&self, buffered: usize) {
        let mut cur = self.peak_bytes.load(Ordering::Relaxed);
        while buffered > cur {
            match self.peak_bytes.compare_exchange(
                cur,
                buffered,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => cur = observed,
            }
        }
    }

    pub fn peak(&self) -> usize {
        self.peak_bytes.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_highest_value() {
        let t = PeakTracker::new();
        t.record(10);
        t.record(4);
        t.record(12);
        t.record(0);
        assert_eq!(t.peak(), 12);
    }
}
