//! Retry policies and the sequential retry driver
//!
//! Provides configurable retry policies with backoff and jitter for handling
//! transient failures in async operations. Attempts are strictly sequential:
//! no attempt starts before the previous one has resolved and its backoff
//! delay has elapsed.

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{FlowError, FlowResult};
use crate::timeout::with_timeout;

/// Strategy mapping a 0-indexed attempt number to a delay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backoff {
    /// Retry immediately, with no delay between attempts
    None,

    /// Constant interval between attempts, in seconds
    Fixed { interval: f64 },

    /// Exponential growth: `initial * factor^attempt`, capped at `max` seconds
    Exponential { initial: f64, factor: f64, max: f64 },
}

impl Backoff {
    fn base_seconds(&self, attempt: usize) -> f64 {
        match *self {
            Backoff::None => 0.0,
            Backoff::Fixed { interval } => interval,
            Backoff::Exponential {
                initial,
                factor,
                max,
            } => (initial * factor.powi(attempt as i32)).min(max),
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            initial: 0.5,
            factor: 2.0,
            max: 128.0,
        }
    }
}

/// Configuration for retrying failed operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    ///
    /// Total attempts = `max_retries + 1`; zero means a single attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Backoff strategy applied between attempts
    #[serde(default)]
    pub backoff: Backoff,

    /// Whether to randomize each delay within the 0.5x..=1.5x band
    #[serde(default = "default_jitter")]
    pub jitter: bool,
}

fn default_max_retries() -> usize {
    3
}

fn default_jitter() -> bool {
    true
}

impl RetryPolicy {
    /// Create a new retry policy with the given retry budget
    ///
    /// # Example
    ///
    /// ```rust
    /// use flowline::retry::RetryPolicy;
    ///
    /// let policy = RetryPolicy::new(3);
    /// assert_eq!(policy.max_retries, 3);
    /// ```
    pub fn new(max_retries: usize) -> Self {
        Self {
            max_retries,
            backoff: Backoff::default(),
            jitter: true,
        }
    }

    /// Set the backoff strategy
    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Use a constant interval between attempts
    pub fn with_fixed_backoff(mut self, interval: f64) -> Self {
        self.backoff = Backoff::Fixed { interval };
        self
    }

    /// Use exponentially growing intervals, capped at `max` seconds
    pub fn with_exponential_backoff(mut self, initial: f64, factor: f64, max: f64) -> Self {
        self.backoff = Backoff::Exponential {
            initial,
            factor,
            max,
        };
        self
    }

    /// Retry immediately, with no delay between attempts
    pub fn without_backoff(mut self) -> Self {
        self.backoff = Backoff::None;
        self
    }

    /// Enable or disable jitter
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Calculate the delay for a given attempt number (0-indexed)
    ///
    /// Attempts beyond the retry budget get a zero delay.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        if attempt >= self.max_retries {
            return Duration::ZERO;
        }

        let base = self.backoff.base_seconds(attempt);

        let seconds = if self.jitter && base > 0.0 {
            let mut rng = rand::thread_rng();
            base * rng.gen_range(0.5..=1.5)
        } else {
            base
        };

        Duration::from_secs_f64(seconds)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Execute an async operation with retry logic
///
/// Invokes a fresh operation from `factory` for every attempt, up to
/// `policy.max_retries + 1` attempts total. The first success is returned
/// immediately; once the budget is exhausted, the failure from the **last**
/// attempt is surfaced and earlier failures are dropped.
///
/// # Example
///
/// ```rust,ignore
/// use flowline::retry::{with_retry, RetryPolicy};
///
/// let policy = RetryPolicy::new(3).with_fixed_backoff(0.5);
/// let result = with_retry(&policy, || call_api()).await?;
/// ```
pub async fn with_retry<F, Fut, T, E>(policy: &RetryPolicy, factory: F) -> FlowResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    with_retry_if(policy, factory, |_| true).await
}

/// Execute an async operation with retry logic, gated by a predicate
///
/// Behaves like [`with_retry`], except a failure for which `is_transient`
/// returns `false` is surfaced immediately without consuming further
/// attempts or sleeping.
pub async fn with_retry_if<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    mut factory: F,
    mut is_transient: P,
) -> FlowResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
    P: FnMut(&E) -> bool,
{
    let total = policy.max_retries + 1;
    let mut failed = 0;

    loop {
        match factory().await {
            Ok(value) => {
                if failed > 0 {
                    debug!(attempt = failed + 1, "retry succeeded");
                }
                return Ok(value);
            }
            Err(error) => {
                failed += 1;
                if failed >= total {
                    warn!(attempts = failed, error = %error, "attempts exhausted");
                    return Err(FlowError::operation(error));
                }
                if !is_transient(&error) {
                    debug!(attempt = failed, error = %error, "failure is not transient, giving up");
                    return Err(FlowError::operation(error));
                }

                let pause = policy.delay_for(failed - 1);
                warn!(
                    attempt = failed,
                    remaining = total - failed,
                    delay_ms = pause.as_millis() as u64,
                    error = %error,
                    "attempt failed, will retry"
                );
                sleep(pause).await;
            }
        }
    }
}

/// Execute an async operation with retry logic, bounding every attempt
///
/// Each attempt independently races against a timer of length `limit`; a
/// timed-out attempt counts as a failed attempt and is retried under the
/// same policy. Exhaustion surfaces the last attempt's failure, which may be
/// [`FlowError::Timeout`].
pub async fn with_retry_and_timeout<F, Fut, T, E>(
    policy: &RetryPolicy,
    limit: Duration,
    mut factory: F,
) -> FlowResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let total = policy.max_retries + 1;
    let mut failed = 0;

    loop {
        match with_timeout(limit, factory()).await {
            Ok(value) => {
                if failed > 0 {
                    debug!(attempt = failed + 1, "retry succeeded");
                }
                return Ok(value);
            }
            Err(failure) => {
                failed += 1;
                if failed >= total {
                    warn!(attempts = failed, error = %failure, "attempts exhausted");
                    return Err(failure);
                }

                let pause = policy.delay_for(failed - 1);
                warn!(
                    attempt = failed,
                    limit_ms = limit.as_millis() as u64,
                    delay_ms = pause.as_millis() as u64,
                    error = %failure,
                    "attempt failed, will retry"
                );
                sleep(pause).await;
            }
        }
    }
}
