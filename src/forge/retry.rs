//! forge::retry
//!
//! Timeout and retry policy for forge requests.
//!
//! A request is repeated only when [`ForgeError::is_retryable`] says so,
//! with exponential backoff between attempts (`initial_backoff * 2^n`,
//! capped at [`MAX_BACKOFF`]).

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::ForgeError;

/// Upper bound on the delay between two attempts.
pub const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How network calls are bounded and repeated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first; at least 1
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_backoff: Duration,
    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` counts from 0.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_backoff
            .saturating_mul(factor)
            .min(MAX_BACKOFF)
    }

    /// Run `op` until it succeeds, fails permanently, or attempts run out.
    ///
    /// The last error is returned when every attempt fails.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ForgeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ForgeError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if !err.is_retryable() || attempt >= max_attempts {
                        if attempt > 1 {
                            debug!(request = what, attempts = attempt, "giving up");
                        }
                        return Err(err);
                    }

                    let delay = self.backoff_delay(attempt - 1);
                    warn!(
                        request = what,
                        attempt,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "request failed, retrying after backoff"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
