//! Bounded exponential backoff.

use std::time::Duration;

/// Default number of attempts per lookup.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default delay after the first failed attempt.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(1);

/// How often, and how patiently, a transient failure is retried.
///
/// The delay after failed attempt `i` (1-indexed) is
/// `initial_delay * 2^(i-1)`; no delay follows the final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Never zero.
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_delay,
        }
    }

    /// Delay to wait after failed attempt `attempt` (1-indexed).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_delay.saturating_mul(factor)
    }

    /// Whether another attempt may follow failed attempt `attempt`.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Every delay a lookup that keeps failing would wait, in order.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(|attempt| self.delay_for(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_INITIAL_DELAY)
    }
}
