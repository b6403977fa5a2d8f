//! Bounded retry with exponential backoff.

use crate::interfaces::{ModelGateway, RuntimeError};
use crate::types::{GatewayRequest, GatewayResponse};
use async_trait::async_trait;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_delay: Duration, backoff: f64) -> Self {
        Self {
            max_attempts,
            initial_delay,
            backoff,
        }
    }

    /// Sleep after the failed attempt `attempt` (zero based), capped at
    /// [`MAX_RETRY_DELAY`].
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.initial_delay.as_secs_f64() * self.backoff.powi(exponent);
        Duration::try_from_secs_f64(secs.max(0.0))
            .unwrap_or(MAX_RETRY_DELAY)
            .min(MAX_RETRY_DELAY)
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` attempts have failed.
///
/// The last failure is returned unchanged. A policy with zero attempts still
/// runs the operation once.
pub async fn retry<F, Fut, T, E>(policy: &RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;
    loop {
        debug!("attempt {}/{}", attempt + 1, attempts);
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 >= attempts => {
                warn!("giving up after {} attempts: {}", attempts, e);
                return Err(e);
            }
            Err(e) => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "attempt {} failed: {}; retrying in {:?}",
                    attempt + 1,
                    e,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Gateway decorator that retries each call under a policy.
pub struct RetryingGateway<G> {
    inner: G,
    policy: RetryPolicy,
}

impl<G: ModelGateway> RetryingGateway<G> {
    pub fn new(inner: G, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &G {
        &self.inner
    }
}

#[async_trait]
impl<G: ModelGateway> ModelGateway for RetryingGateway<G> {
    async fn send(&self, request: &GatewayRequest<'_>) -> Result<GatewayResponse, RuntimeError> {
        retry(&self.policy, || self.inner.send(request)).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[test]
    fn test_delay_grows_geometrically() {
        let policy = RetryPolicy::new(4, Duration::from_millis(100), 2.0);
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy::new(5, Duration::from_secs(1), 1e300);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), MAX_RETRY_DELAY);
        assert_eq!(policy.delay_for(3), MAX_RETRY_DELAY);

        let policy = RetryPolicy::new(3, Duration::from_secs(1), f64::INFINITY);
        assert_eq!(policy.delay_for(1), MAX_RETRY_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_infinite_backoff_waits_the_cap() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10), f64::INFINITY);
        let start = Instant::now();
        let result: Result<(), String> = retry(&policy, || async { Err("down".to_string()) }).await;

        assert_eq!(result.unwrap_err(), "down");
        // First wait uses backoff^0, so only the initial delay is slept.
        assert!(start.elapsed() < Duration::from_millis(15));

        let policy = RetryPolicy::new(3, Duration::from_millis(10), f64::INFINITY);
        let start = Instant::now();
        let _: Result<(), String> = retry(&policy, || async { Err("down".to_string()) }).await;
        assert!(start.elapsed() >= MAX_RETRY_DELAY);
        assert!(start.elapsed() < MAX_RETRY_DELAY + Duration::from_millis(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fails_twice_then_succeeds() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100), 3.0);
        let calls = AtomicU32::new(0);
        let seen = Mutex::new(Vec::new());

        let result: Result<&str, String> = retry(&policy, || {
            seen.lock().push(Instant::now());
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(format!("failure {n}"))
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let seen = seen.lock();
        let first = seen[1] - seen[0];
        let second = seen[2] - seen[1];
        assert!(first >= Duration::from_millis(100) && first < Duration::from_millis(105));
        assert!(second >= Duration::from_millis(300) && second < Duration::from_millis(305));
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_error_is_returned_unchanged() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), 2.0);
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = retry(&policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(format!("failure {n}")) }
        })
        .await;

        assert_eq!(result.unwrap_err(), "failure 2");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_does_not_sleep() {
        let policy = RetryPolicy::default();
        let start = Instant::now();
        let result: Result<u8, String> = retry(&policy, || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_zero_attempts_runs_once() {
        let policy = RetryPolicy::new(0, Duration::from_millis(1), 2.0);
        let calls = AtomicU32::new(0);
        let _: Result<(), String> = retry(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("no".to_string()) }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
