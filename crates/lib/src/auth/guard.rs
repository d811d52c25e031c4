//! Brute-force cooldown guard.
//!
//! Tracks the last failed login attempt per username in a transient cache and
//! refuses further attempts inside the configured window. The cache is a
//! collaborator so a host can back it with whatever transient store it
//! already has; eviction is the cache's business, and an evicted entry simply
//! means "no cooldown applies".

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::errors::AuthError;
use crate::clock::Clock;
use crate::policy::COOLDOWN_DISABLED;

/// Transient per-username attempt-timestamp store.
///
/// Last-write-wins on concurrent `set` calls is acceptable; it only shifts a
/// cooldown window by a few attempts and never bypasses authentication.
pub trait AttemptCache: Send + Sync {
    /// Last recorded attempt timestamp for `username`, seconds since epoch.
    fn get(&self, username: &str) -> Option<i64>;

    /// Record an attempt timestamp, overwriting any prior one.
    fn set(&self, username: &str, timestamp: i64);
}

/// Process-local in-memory attempt cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, i64>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttemptCache for MemoryCache {
    fn get(&self, username: &str) -> Option<i64> {
        self.entries.lock().unwrap().get(username).copied()
    }

    fn set(&self, username: &str, timestamp: i64) {
        self.entries
            .lock()
            .unwrap()
            .insert(username.to_string(), timestamp);
    }
}

/// Enforces the per-username login cooldown window.
pub struct BruteForceGuard {
    cache: Arc<dyn AttemptCache>,
    clock: Arc<dyn Clock>,
    cooldown_secs: i64,
}

impl BruteForceGuard {
    /// Create a guard with the given window. [`COOLDOWN_DISABLED`] (or any
    /// negative value) turns the check off entirely.
    pub fn new(cache: Arc<dyn AttemptCache>, clock: Arc<dyn Clock>, cooldown_secs: i64) -> Self {
        Self {
            cache,
            clock,
            cooldown_secs,
        }
    }

    /// Fail with [`AuthError::Cooldown`] while a prior attempt for this
    /// username is inside the window.
    pub fn check(&self, username: &str) -> Result<(), AuthError> {
        if self.cooldown_secs <= COOLDOWN_DISABLED {
            return Ok(());
        }
        if let Some(last_attempt) = self.cache.get(username) {
            let elapsed = self.clock.now_secs() - last_attempt;
            if elapsed < self.cooldown_secs {
                return Err(AuthError::Cooldown {
                    seconds_remaining: self.cooldown_secs - elapsed,
                });
            }
        }
        Ok(())
    }

    /// Record a failed attempt, overwriting any prior timestamp.
    pub fn record_failure(&self, username: &str) {
        self.cache.set(username, self.clock.now_secs());
    }
}
