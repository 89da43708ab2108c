//! Retry support for network operations.
//!
//! RDAP registries drop connections and rate-limit aggressively under
//! fan-out load; a couple of spaced retries recovers most of those. Backoff
//! is linear (delay grows by the initial step each attempt) and capped.

use std::time::Duration;

use tokio::time::sleep;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retry attempts after the initial one.
    pub max_attempts: u32,

    /// Delay before the first retry; grows linearly per attempt.
    pub initial_delay: Duration,

    /// Upper bound on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based).
    fn delay_for(&self, attempt: u32) -> Duration {
        let scaled = self.initial_delay.saturating_mul(attempt);
        scaled.min(self.max_delay)
    }
}

/// Policy deciding whether an error is worth another attempt.
pub trait RetryPolicy<E> {
    fn should_retry(&self, error: &E) -> bool;
}

/// Blanket policy for closures.
impl<E, F> RetryPolicy<E> for F
where
    F: Fn(&E) -> bool,
{
    fn should_retry(&self, error: &E) -> bool {
        self(error)
    }
}

/// Run `operation`, retrying per `policy` with linear backoff.
pub async fn retry_async<F, Fut, T, E, P>(
    config: &RetryConfig,
    policy: P,
    operation: F,
) -> Result<T, E>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    P: RetryPolicy<E>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= config.max_attempts || !policy.should_retry(&error) {
                    return Err(error);
                }
                attempt += 1;
                sleep(config.delay_for(attempt)).await;
            }
        }
    }
}
