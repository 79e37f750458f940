//! Seek reference points and variant selectors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Reference point for `seek`, matching the classic `SEEK_SET`/`SEEK_CUR`/`SEEK_END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Whence {
    /// Absolute from the logical start of the stream.
    #[default]
    Start,
    /// Relative to the current position.
    Current,
    /// Relative to the declared total size; offset is usually negative.
    End,
}

impl Whence {
    /// Map a raw integer whence. `1` and `2` select `Current`/`End`; every
    /// other value (including negatives) falls back to `Start`.
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            1 => Whence::Current,
            2 => Whence::End,
            _ => Whence::Start,
        }
    }

    pub fn as_raw(self) -> i32 {
        match self {
            Whence::Start => 0,
            Whence::Current => 1,
            Whence::End => 2,
        }
    }
}

impl From<i32> for Whence {
    fn from(raw: i32) -> Self {
        Whence::from_raw(raw)
    }
}

/// Which flow-control policy a driver wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Condvar-gated, consumer prunes on every read.
    Download,
    /// Condvar-gated, driver prunes through a progress callback.
    Upload,
    /// No blocking primitives; sleep-and-retry with linear backoff.
    Polling,
}

impl Variant {
    pub fn as_str(self) -> &'static str {
        match self {
            Variant::Download => "download",
            Variant::Upload => "upload",
            Variant::Polling => "polling",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "download" => Ok(Variant::Download),
            "upload" => Ok(Variant::Upload),
            "polling" | "poll" => Ok(Variant::Polling),
            other => Err(Error::Config(format!("unknown stream variant '{other}'"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_whence_out_of_range_means_start() {
        assert_eq!(Whence::from_raw(0), Whence::Start);
        assert_eq!(Whence::from_raw(1), Whence::Current);
        assert_eq!(Whence::from_raw(2), Whence::End);
        assert_eq!(Whence::from_raw(-1), Whence::Start);
        assert_eq!(Whence::from_raw(3), Whence::Start);
        assert_eq!(Whence::End.as_raw(), 2);
    }

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!("Upload".parse::<Variant>().unwrap(), Variant::Upload);
        assert_eq!("poll".parse::<Variant>().unwrap(), Variant::Polling);
        assert!("sideways".parse::<Variant>().is_err());
    }
}
