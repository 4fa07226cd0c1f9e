//! Retry policy for provider requests
//!
//! Backoff grows geometrically from the initial interval and each delay is
//! scaled by a random factor in `[1 - randomness, 1 + randomness]`. Only
//! transport failures and the statuses in `RETRY_STATUSES` are retried.

use std::time::{Duration, SystemTime};

use rand::Rng;
use reqwest::StatusCode;
use reqwest_retry::{default_on_request_failure, Retryable, RetryableStrategy};
use retry_policies::{RetryDecision, RetryPolicy};

/// Statuses worth retrying; every other non-success status is final
pub const RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Exponential backoff with bounded relative jitter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProviderBackoff {
    /// Retries after the initial attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub interval: Duration,
    /// Multiplier applied per retry
    pub backoff_factor: f64,
    /// Relative jitter, 0.1 means ±10%
    pub randomness: f64,
}

impl Default for ProviderBackoff {
    fn default() -> Self {
        Self {
            max_retries: 3,
            interval: Duration::from_millis(500),
            backoff_factor: 2.0,
            randomness: 0.1,
        }
    }
}

impl ProviderBackoff {
    /// Delay before retry number `n_past_retries + 1`, without jitter
    pub fn base_delay(&self, n_past_retries: u32) -> Duration {
        let exponent = i32::try_from(n_past_retries).unwrap_or(i32::MAX);
        self.interval.mul_f64(self.backoff_factor.powi(exponent))
    }

    /// Delay with jitter applied
    pub fn delay(&self, n_past_retries: u32) -> Duration {
        let base = self.base_delay(n_past_retries);
        if self.randomness <= 0.0 {
            return base;
        }
        let scale = rand::thread_rng().gen_range(1.0 - self.randomness..=1.0 + self.randomness);
        base.mul_f64(scale.max(0.0))
    }
}

impl RetryPolicy for ProviderBackoff {
    fn should_retry(&self, _request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            return RetryDecision::DoNotRetry;
        }
        RetryDecision::Retry {
            execute_after: SystemTime::now() + self.delay(n_past_retries),
        }
    }
}

/// Decides which outcomes are transient
#[derive(Debug, Clone, Copy, Default)]
pub struct ProviderRetryStrategy;

impl RetryableStrategy for ProviderRetryStrategy {
    fn handle(
        &self,
        res: &Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(response) => classify_status(response.status()),
            Err(error) => default_on_request_failure(error),
        }
    }
}

fn classify_status(status: StatusCode) -> Option<Retryable> {
    if status.is_success() {
        None
    } else if RETRY_STATUSES.contains(&status.as_u16()) {
        Some(Retryable::Transient)
    } else {
        Some(Retryable::Fatal)
    }
}
