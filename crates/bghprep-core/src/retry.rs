//! Retry with exponential backoff for remote lookups

use std::time::Duration;

use crate::error::LookupError;
use crate::http::http_config;

/// Bounded retry budget for one lookup.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Policy from the global [`HttpConfig`](crate::HttpConfig).
    pub fn from_http_config() -> Self {
        let config = http_config();
        Self {
            max_retries: config.max_retries,
            base_delay: config.backoff_base,
        }
    }

    /// Exponential backoff: base * 2^(attempt-1) (2s, 4s, 8s, ... with a 2s base)
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_http_config()
    }
}

/// Retry a fallible lookup with exponential backoff.
///
/// On retryable errors, logs the failure, sleeps, and retries up to
/// `policy.max_retries` times.
///
/// Returns `Ok(T)` on first success, or the final `Err` on exhaustion / non-retryable error.
pub fn retry_with_backoff<T>(
    label: &str,
    policy: RetryPolicy,
    mut attempt_fn: impl FnMut() -> Result<T, LookupError>,
) -> Result<T, LookupError> {
    let mut attempt = 0u32;
    loop {
        match attempt_fn() {
            Ok(v) => return Ok(v),
            Err(e) if attempt < policy.max_retries && e.is_retryable() => {
                attempt += 1;
                let delay = policy.backoff_duration(attempt);
                log::debug!(
                    "{label}: attempt {attempt}/{} failed: {e}, retrying in {delay:?}",
                    policy.max_retries
                );
                std::thread::sleep(delay);
            }
            Err(e) => {
                log::debug!("{label}: giving up after {} attempts: {e}", attempt + 1);
                return Err(e);
            }
        }
    }
}
