//! Retry backoff for the outer sync scheduler.
//!
//! Exponential backoff with random jitter, so many clients coming back
//! online together do not retry in lockstep.

use std::time::Duration;

/// How the scheduler spaces out retries of a failed orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. At least 1.
    pub max_attempts: u32,
    /// Delay before the second attempt, before jitter.
    pub initial_backoff: Duration,
    /// Upper bound on the base delay.
    pub max_backoff: Duration,
    /// Upper bound on the random jitter added to each delay.
    pub max_jitter: Duration,
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// Formula: min(max_backoff, initial_backoff * 2^(attempt-1)) + random(0..=max_jitter)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        let base = self
            .initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff);

        base + random_jitter(self.max_jitter)
    }

    /// Whether another attempt is allowed after `attempt` attempts ran.
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts.max(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            max_jitter: Duration::from_millis(250),
        }
    }
}

/// Random duration between zero and `max` inclusive, millisecond resolution.
fn random_jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    let mut bytes = [0u8; 8];
    if getrandom::getrandom(&mut bytes).is_err() {
        return Duration::ZERO;
    }
    let random = u64::from_le_bytes(bytes);
    Duration::from_millis(random % (max_ms + 1))
}
