//! Bounded, fixed-delay retry around a [`Transport`].
//!
//! Remote sources are flaky, so every site fetch goes through [`RetryFetch`]:
//! a decorator that calls the inner transport up to `attempts` times, sleeping
//! a fixed `delay` between attempts, and surfaces a single terminal
//! [`ReadingError::Fetch`] when the budget is spent.
//!
//! # Architecture
//!
//! - [`RetryPolicy`]: plain value object (attempts, delay, timeout)
//! - [`Sleeper`]: how to wait between attempts ([`TokioSleeper`] in production)
//! - [`RetryFetch`]: the retrying call helper
//!
//! Attempts are strictly sequential; there is no racing of concurrent attempts.

use crate::error::{FetchError, ReadingError};
use crate::scrapers::http::Transport;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// How hard to try a remote source before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, at least 1. A value of 1 means no retry.
    pub attempts: u32,
    /// Fixed wait between attempts. Zero retries immediately.
    pub delay: Duration,
    /// Per-attempt request timeout.
    pub timeout: Duration,
}

impl RetryPolicy {
    /// Build a policy, raising `attempts` to 1 if given 0.
    pub fn new(attempts: u32, delay: Duration, timeout: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
            timeout,
        }
    }

    /// Upper bound on the time one fetch can take: `attempts × (timeout + delay)`.
    pub fn worst_case(&self) -> Duration {
        (self.timeout + self.delay).saturating_mul(self.attempts)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(5), Duration::from_secs(10))
    }
}

/// Waits between attempts.
pub trait Sleeper {
    async fn sleep(&self, delay: Duration);
}

impl<S: Sleeper> Sleeper for &S {
    async fn sleep(&self, delay: Duration) {
        (**self).sleep(delay).await
    }
}

/// Real sleeping on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, delay: Duration) {
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// Decorator that retries an inner [`Transport`] according to a [`RetryPolicy`].
pub struct RetryFetch<T, S = TokioSleeper> {
    inner: T,
    policy: RetryPolicy,
    sleeper: S,
}

impl<T: Transport> RetryFetch<T> {
    /// Wrap `inner` with `policy`, sleeping on the tokio timer.
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self::with_sleeper(inner, policy, TokioSleeper)
    }
}

impl<T: Transport, S: Sleeper> RetryFetch<T, S> {
    /// Wrap `inner` with `policy` and a custom [`Sleeper`].
    pub fn with_sleeper(inner: T, policy: RetryPolicy, sleeper: S) -> Self {
        Self {
            inner,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch `url`, retrying on any [`FetchError`].
    ///
    /// Returns the body of the first successful attempt, or
    /// [`ReadingError::Fetch`] carrying the last attempt's failure.
    #[instrument(level = "info", skip_all, fields(%url, attempts = self.policy.attempts))]
    pub async fn fetch(&self, url: &str) -> Result<String, ReadingError> {
        let total_t0 = Instant::now();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            let attempt_t0 = Instant::now();
            let cause: FetchError = match self.inner.get(url, self.policy.timeout).await {
                Ok(body) => {
                    debug!(
                        attempt,
                        bytes = body.len(),
                        elapsed_ms = attempt_t0.elapsed().as_millis() as u64,
                        "fetch succeeded"
                    );
                    return Ok(body);
                }
                Err(e) => e,
            };

            if attempt >= self.policy.attempts {
                error!(
                    attempt,
                    elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                    error = %cause,
                    "fetch exhausted retries"
                );
                return Err(ReadingError::Fetch {
                    url: url.to_string(),
                    attempts: attempt,
                    cause,
                });
            }

            warn!(
                attempt,
                max = self.policy.attempts,
                elapsed_ms_attempt = attempt_t0.elapsed().as_millis() as u64,
                delay = ?self.policy.delay,
                error = %cause,
                "fetch attempt failed; retrying"
            );
            self.sleeper.sleep(self.policy.delay).await;
        }
    }
}

impl<T, S> fmt::Debug for RetryFetch<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("policy", &self.policy)
            .finish()
    }
}
