//! Retry policy with exponential backoff and jitter for LLM API calls.
//!
//! # Retryable Errors
//!
//! | Retryable | Non-Retryable |
//! |-----------|---------------|
//! | HTTP 429 (Rate Limited) | HTTP 400 (Bad Request) |
//! | HTTP 500/502/503/504 | HTTP 401/403 (Auth Errors) |
//! | HTTP 408 (Request Timeout) | HTTP 404/422 |
//! | Connection errors | Malformed model output |

use std::time::Duration;

use rand::Rng;

/// Retry policy configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts, including the first (default: 3).
    pub max_attempts: u32,
    /// Initial backoff duration (default: 500ms).
    pub initial_backoff: Duration,
    /// Maximum backoff duration (default: 20s).
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential growth (default: 2.0).
    pub backoff_multiplier: f64,
    /// Jitter factor for randomization (default: 0.2 = ±20%).
    pub jitter_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(20),
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }
}

/// Calculator for exponential backoff with jitter.
#[derive(Debug)]
pub struct Backoff {
    attempt: u32,
    max_attempts: u32,
    initial_backoff_ms: u64,
    max_backoff_ms: u64,
    backoff_multiplier: f64,
    jitter_factor: f64,
}

impl Backoff {
    /// Create a new backoff calculator from a retry policy.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(policy: &RetryPolicy) -> Self {
        Self {
            attempt: 1,
            max_attempts: policy.max_attempts,
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            backoff_multiplier: policy.backoff_multiplier,
            jitter_factor: policy.jitter_factor,
        }
    }

    /// Delay before the next attempt, or `None` once attempts are exhausted.
    pub fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempt >= self.max_attempts {
            return None;
        }
        let base = self.base_backoff_ms();
        self.attempt += 1;
        Some(Duration::from_millis(self.apply_jitter(base).min(self.max_backoff_ms)))
    }

    /// Attempts made so far.
    #[must_use]
    pub const fn attempt(&self) -> u32 {
        self.attempt
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap
    )]
    fn base_backoff_ms(&self) -> u64 {
        let multiplier = self.backoff_multiplier.powi((self.attempt - 1) as i32);
        let backoff = (self.initial_backoff_ms as f64 * multiplier) as u64;
        backoff.min(self.max_backoff_ms)
    }

    /// Random value in `[backoff * (1 - jitter), backoff * (1 + jitter)]`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn apply_jitter(&self, backoff_ms: u64) -> u64 {
        if self.jitter_factor <= 0.0 || backoff_ms == 0 {
            return backoff_ms;
        }
        let jitter_range = backoff_ms as f64 * self.jitter_factor;
        let min = (backoff_ms as f64 - jitter_range).max(0.0);
        let max = backoff_ms as f64 + jitter_range;
        rand::rng().random_range(min..=max) as u64
    }
}

/// Whether an HTTP status is worth retrying.
#[must_use]
pub const fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn no_jitter(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(300),
            backoff_multiplier: 2.0,
            jitter_factor: 0.0,
        }
    }

    #[test]
    fn backoff_grows_and_caps() {
        let mut backoff = Backoff::new(&no_jitter(5));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(300)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(300)));
        assert_eq!(backoff.next_backoff(), None);
        assert_eq!(backoff.attempt(), 5);
    }

    #[test]
    fn single_attempt_policy_never_retries() {
        let mut backoff = Backoff::new(&RetryPolicy::none());
        assert_eq!(backoff.next_backoff(), None);
    }

    #[test]
    fn jitter_stays_within_band() {
        let policy = RetryPolicy {
            jitter_factor: 0.2,
            ..no_jitter(2)
        };
        for _ in 0..50 {
            let delay = Backoff::new(&policy).next_backoff().unwrap();
            assert!(delay >= Duration::from_millis(80) && delay <= Duration::from_millis(120));
        }
    }

    #[test_case(429, true)]
    #[test_case(503, true)]
    #[test_case(408, true)]
    #[test_case(400, false)]
    #[test_case(401, false)]
    #[test_case(422, false)]
    fn retryable_statuses(status: u16, expected: bool) {
        assert_eq!(is_retryable_status(status), expected);
    }
}
