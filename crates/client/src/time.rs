//! Time source for cart timestamps.
//!
//! Abstracted so expiration can be tested with deterministic time.

use std::sync::Mutex;

use chrono::{DateTime, TimeDelta, Utc};

/// Source of the current time.
pub trait TimeSource: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven time source for tests and replays.
#[derive(Debug)]
pub struct ManualTimeSource {
    time: Mutex<DateTime<Utc>>,
}

impl ManualTimeSource {
    /// Create a time source frozen at `initial`.
    #[must_use]
    pub const fn new(initial: DateTime<Utc>) -> Self {
        Self {
            time: Mutex::new(initial),
        }
    }

    /// Move time forward.
    pub fn advance(&self, delta: TimeDelta) {
        if let Ok(mut time) = self.time.lock() {
            *time += delta;
        }
    }

    /// Jump to an absolute time.
    pub fn set(&self, time: DateTime<Utc>) {
        if let Ok(mut current) = self.time.lock() {
            *current = time;
        }
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        self.time
            .lock()
            .map_or_else(|poisoned| *poisoned.into_inner(), |time| *time)
    }
}
