//! Bounded retry policy for actuation commands
//!
//! Vehicle actuation over a cellular-connected backend is best-effort: the
//! server may still be processing the original command when a retry lands,
//! so retries are correlated to the server-issued event id and exhaustion is
//! not an error. The delay is fixed; no backoff, no jitter.

use std::time::Duration;

/// Attempt budget and spacing for one actuation command invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, first attempt included
    pub max_attempts: u32,
    /// Fixed delay between consecutive attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Whether another attempt is allowed after `attempts_made` attempts
    pub fn allows_another(&self, attempts_made: u32) -> bool {
        attempts_made < self.max_attempts
    }
}
