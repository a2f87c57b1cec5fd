//! Retry policy and response outcomes.
//!
//! The policy is a pure function of the attempt number; the executor owns the
//! loop and the sleeping.

use std::time::Duration;

use cms_core::constants;
use cms_core::error::CmsError;

/// Classified result of one attempt.
#[derive(Debug)]
pub enum Outcome<T> {
    /// The attempt produced a usable response.
    Success(T),
    /// The attempt failed and must not be repeated.
    Terminal(CmsError),
    /// The attempt failed transiently and may be repeated.
    Retryable(CmsError),
}

/// What to do after a retryable failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryDecision {
    pub should_retry: bool,
    pub wait: Duration,
}

/// Retry configuration for API requests.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Wait before the first retry.
    pub min_timeout: Duration,
    /// Growth factor applied to the wait for each further retry.
    pub factor: u32,
    /// Maximum delay cap.
    pub max_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

impl RetryPolicy {
    /// Three attempts, waiting 5s then 10s.
    pub fn enabled() -> Self {
        Self {
            max_attempts: constants::MAX_RETRY_COUNT + 1,
            min_timeout: Duration::from_millis(constants::MIN_TIMEOUT_MS),
            factor: constants::RETRY_FACTOR,
            max_timeout: Duration::from_secs(60),
        }
    }

    /// A single attempt.
    pub fn disabled() -> Self {
        Self {
            max_attempts: 1,
            ..Self::enabled()
        }
    }

    /// Policy for the client-level `retry` switch.
    pub fn from_flag(retry: bool) -> Self {
        if retry {
            Self::enabled()
        } else {
            Self::disabled()
        }
    }

    /// Override the wait before the first retry.
    pub fn with_min_timeout(mut self, min_timeout: Duration) -> Self {
        self.min_timeout = min_timeout;
        self.max_timeout = self.max_timeout.max(min_timeout);
        self
    }

    /// Override the total number of attempts (at least one).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Decide whether to retry after `attempt` attempts (1-based) have failed.
    pub fn attempt(&self, attempt: u32) -> RetryDecision {
        let should_retry = attempt < self.max_attempts;
        let multiplier = self.factor.max(1).saturating_pow(attempt.saturating_sub(1));
        let wait = self
            .min_timeout
            .saturating_mul(multiplier)
            .min(self.max_timeout)
            .max(self.min_timeout);
        RetryDecision { should_retry, wait }
    }
}
