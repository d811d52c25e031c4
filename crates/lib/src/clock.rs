//! Time provider abstraction
//!
//! The brute-force cooldown window is measured against an injected [`Clock`]
//! rather than ambient system time, so production code uses [`SystemClock`]
//! while tests drive a [`FixedClock`] through the window deterministically.

use std::fmt::Debug;
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(any(test, feature = "testing"))]
use std::sync::Mutex;

/// A time provider for getting current timestamps.
pub trait Clock: Send + Sync + Debug {
    /// Returns the current time as seconds since Unix epoch.
    fn now_secs(&self) -> i64;
}

/// Production clock using real system time.
///
/// This is the default clock implementation used in production code.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

/// Test clock with manually controlled time.
///
/// Unlike [`SystemClock`], this clock only moves when a test calls
/// [`FixedClock::advance`] or [`FixedClock::set`], which makes cooldown-window
/// assertions exact.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug)]
pub struct FixedClock {
    secs: Mutex<i64>,
}

#[cfg(any(test, feature = "testing"))]
impl FixedClock {
    /// Create a new fixed clock at the given time in seconds since epoch.
    pub fn new(secs: i64) -> Self {
        Self {
            secs: Mutex::new(secs),
        }
    }

    /// Advance the clock by the given number of seconds.
    pub fn advance(&self, secs: i64) {
        *self.secs.lock().unwrap() += secs;
    }

    /// Set the clock to a specific time in seconds since epoch.
    pub fn set(&self, secs: i64) {
        *self.secs.lock().unwrap() = secs;
    }
}

#[cfg(any(test, feature = "testing"))]
impl Clock for FixedClock {
    fn now_secs(&self) -> i64 {
        *self.secs.lock().unwrap()
    }
}

#[cfg(any(test, feature = "testing"))]
impl Default for FixedClock {
    fn default() -> Self {
        // 2024-01-01 00:00:00 UTC
        Self::new(1_704_067_200)
    }
}
