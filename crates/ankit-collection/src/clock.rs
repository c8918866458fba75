//! Time sources for record timestamps.

use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies the current time to the save hooks.
pub trait Clock {
    /// Current Unix time in milliseconds.
    fn now_millis(&self) -> i64;

    /// Current Unix time in seconds.
    fn now_secs(&self) -> i64 {
        self.now_millis() / 1000
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        now_millis()
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub i64);

impl FixedClock {
    /// Clock frozen at `secs` seconds past the epoch.
    pub fn from_secs(secs: i64) -> Self {
        Self(secs * 1000)
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

/// Current Unix time in milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

/// Current Unix time in seconds.
pub fn now_secs() -> i64 {
    now_millis() / 1000
}
