//! Bounded retry for chain reads.
//!
//! Each attempt is capped by the request timeout. Transient failures are
//! retried with exponential backoff; once the attempt budget is spent the
//! last failure surfaces as [`ChainError::Unavailable`]. Anything that is not
//! transient (node error responses, reverts, decode failures) is returned on
//! the first attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, timeout};
use tracing::warn;

use crate::error::{ChainError, Result};
use crate::infrastructure::config::rpc::RpcConfig;

/// Exponential backoff with a bounded number of attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
    request_timeout: Duration,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(
        max_attempts: u32,
        base_delay: Duration,
        max_delay: Duration,
        request_timeout: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
            request_timeout,
        }
    }

    #[must_use]
    pub fn from_config(config: &RpcConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
            config.request_timeout(),
        )
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Delay after the `attempt`-th failure (1-based): base, 2×base, 4×base…
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }

    /// Run `call` until it succeeds, fails permanently or runs out of attempts.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Unavailable`] once transient failures exhaust the
    /// budget, or the first non-transient error unchanged.
    pub async fn run<T, F, Fut>(&self, operation: &'static str, mut call: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = match timeout(self.request_timeout, call()).await {
                Ok(outcome) => outcome,
                Err(_) => Err(ChainError::timed_out(operation, self.request_timeout).into()),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) if attempt >= self.max_attempts => {
                    return Err(ChainError::Unavailable {
                        operation,
                        attempts: attempt,
                        reason: e.to_string(),
                    }
                    .into());
                }
                Err(e) => {
                    let delay = self.delay_after(attempt);
                    warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Chain call failed, retrying"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RpcConfig::default())
    }
}
