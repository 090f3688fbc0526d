//! Exponential backoff for transient platform failures.

use std::time::Duration;

use rand::Rng;

/// Retries allowed after the first attempt by default.
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// Delay before the first retry by default.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);
/// Upper bound on the delay between attempts by default.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How often and how patiently the dispatcher retries transient failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub initial_backoff: Duration,
    /// Cap applied to the doubled delay.
    pub max_backoff: Duration,
    /// Adds up to a quarter of the delay as random jitter.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            max_backoff: DEFAULT_MAX_BACKOFF,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
            jitter: false,
        }
    }

    /// Default retry count with millisecond delays, for tests and local
    /// tooling talking to a stub server.
    #[must_use]
    pub const fn fast() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(5),
            jitter: false,
        }
    }

    /// Sets the retry count.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Total attempts including the first one.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait before retry number `retry` (zero-based).
    #[must_use]
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1_u32.checked_shl(retry).unwrap_or(u32::MAX);
        let base = self
            .initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff);
        if !self.jitter || base.is_zero() {
            return base;
        }
        let spread = u64::try_from(base.as_millis() >> 2).unwrap_or(u64::MAX);
        let extra = rand::thread_rng().gen_range(0..=spread);
        base.saturating_add(Duration::from_millis(extra))
    }
}
