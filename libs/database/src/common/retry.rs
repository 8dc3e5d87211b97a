use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Backoff policy for connection attempts made at startup
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay, in milliseconds
    pub max_delay_ms: u64,

    /// Growth factor applied after every failed retry
    pub backoff_multiplier: f64,

    /// Scale each delay by a random factor in [0.5, 1.0)
    pub use_jitter: bool,
}

impl RetryConfig {
    /// 3 retries, 100ms initial delay, 5s cap, doubling, jittered
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay_ms: u64) -> Self {
        self.initial_delay_ms = delay_ms;
        self
    }

    pub fn with_max_delay(mut self, delay_ms: u64) -> Self {
        self.max_delay_ms = delay_ms;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.use_jitter = false;
        self
    }

    /// Un-jittered delay before retry number `retry` (1-based)
    pub fn base_delay(&self, retry: u32) -> u64 {
        let exponent = retry.saturating_sub(1) as i32;
        let delay = self.initial_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        (delay as u64).min(self.max_delay_ms)
    }

    /// Actual sleep before retry number `retry`
    fn delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        let millis = if self.use_jitter { jittered(base) } else { base };
        Duration::from_millis(millis)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
            backoff_multiplier: 2.0,
            use_jitter: true,
        }
    }
}

/// Run `operation` until it succeeds or the retry budget is spent.
///
/// Makes at most `config.max_retries + 1` attempts and returns the last
/// error unchanged.
pub async fn retry_with_backoff<F, Fut, T, E>(mut operation: F, config: RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0u32;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(retries = attempt, "Connected after retrying");
                }
                return Ok(value);
            }
            Err(error) => error,
        };

        if attempt == config.max_retries {
            warn!(attempts = attempt + 1, error = %error, "Giving up");
            return Err(error);
        }

        attempt += 1;
        let delay = config.delay_for(attempt);
        debug!(
            retry = attempt,
            of = config.max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Attempt failed, backing off"
        );
        tokio::time::sleep(delay).await;
    }
}

/// `delay` scaled by a pseudo-random factor in [0.5, 1.0)
fn jittered(delay: u64) -> u64 {
    use std::collections::hash_map::RandomState;
    use std::hash::BuildHasher;

    let percent = 50 + RandomState::new().hash_one(std::time::Instant::now()) % 50;
    delay * percent / 100
}

/// [`retry_with_backoff`] with the default [`RetryConfig`]
pub async fn retry<F, Fut, T, E>(operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    retry_with_backoff(operation, RetryConfig::default()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Operation refusing the first `failures` calls; returns it with its call counter
    fn flaky_connect(
        failures: u32,
    ) -> (
        Arc<AtomicU32>,
        impl FnMut() -> std::future::Ready<Result<&'static str, String>>,
    ) {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = Arc::clone(&calls);
        let operation = move || {
            let call = seen.fetch_add(1, Ordering::SeqCst);
            std::future::ready(if call < failures {
                Err(format!("connection refused (call {})", call + 1))
            } else {
                Ok("connected")
            })
        };
        (calls, operation)
    }

    fn fast() -> RetryConfig {
        RetryConfig::new().with_initial_delay(2).without_jitter()
    }

    #[tokio::test]
    async fn test_first_attempt_success_does_not_retry() {
        let (calls, operation) = flaky_connect(0);

        assert_eq!(retry(operation).await, Ok("connected"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_within_budget() {
        let (calls, operation) = flaky_connect(2);

        assert_eq!(retry_with_backoff(operation, fast()).await, Ok("connected"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausted_budget_returns_last_error() {
        let (calls, operation) = flaky_connect(u32::MAX);

        let result = retry_with_backoff(operation, fast().with_max_retries(2)).await;

        assert_eq!(result, Err("connection refused (call 3)".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_zero_retries_makes_one_attempt() {
        let (calls, operation) = flaky_connect(1);

        assert!(retry_with_backoff(operation, fast().with_max_retries(0)).await.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_base_delay_doubles_then_caps() {
        let config = RetryConfig::new().with_initial_delay(100).with_max_delay(350);

        let delays: Vec<u64> = (1..=4).map(|retry| config.base_delay(retry)).collect();
        assert_eq!(delays, [100, 200, 350, 350]);
    }

    #[test]
    fn test_jittered_delay_stays_in_range() {
        for _ in 0..20 {
            let delay = jittered(1000);
            assert!((500..1000).contains(&delay), "delay {delay}");
        }
        assert_eq!(
            RetryConfig::new().without_jitter().delay_for(1),
            Duration::from_millis(100)
        );
    }
}
