//! Timeout wrappers and reusable deadlines
//!
//! Wrapping an operation in a timeout races it against a timer. When the
//! timer wins, the losing future is dropped, which cancels any further
//! progress at its next suspension point. Work the operation has already
//! performed, or detached onto the executor with `spawn`, is not rolled back
//! and may still observably complete after the timeout.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout as tokio_timeout;
use tracing::debug;

use crate::error::{FlowError, FlowResult};

/// Execute an async operation with a timeout
///
/// If the operation completes before the timer elapses, its outcome is
/// returned unchanged: a success as `Ok`, a failure wrapped as
/// [`FlowError::Operation`] with the underlying error carried through. If the
/// timer elapses first, the operation is dropped and the result is
/// [`FlowError::Timeout`]. On an exact tie the operation is polled before the
/// timer, so its outcome wins.
///
/// # Example
///
/// ```rust,ignore
/// use flowline::timeout::with_timeout;
/// use std::time::Duration;
///
/// let result = with_timeout(Duration::from_secs(1), slow_operation()).await;
/// assert!(result.unwrap_err().is_timeout());
/// ```
pub async fn with_timeout<F, T, E>(limit: Duration, operation: F) -> FlowResult<T, E>
where
    F: Future<Output = std::result::Result<T, E>>,
{
    match tokio_timeout(limit, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(FlowError::operation(error)),
        Err(_elapsed) => {
            debug!(limit_ms = limit.as_millis() as u64, "operation timed out");
            Err(FlowError::Timeout { limit })
        }
    }
}

/// A fixed point in time bounding all operations run under it
///
/// Created from a duration, a deadline lets a call tree share one time
/// budget across several sequential awaits: each [`Deadline::run`] call uses
/// whatever time remains.
///
/// # Example
///
/// ```rust,ignore
/// use flowline::timeout::Deadline;
/// use std::time::Duration;
///
/// let deadline = Deadline::after(Duration::from_secs(30));
/// let user = deadline.run(fetch_user(id)).await?;
/// let posts = deadline.run(fetch_posts(&user)).await?;
/// ```
pub struct Deadline {
    at: tokio::time::Instant,
    limit: Duration,
}

impl Deadline {
    /// Create a deadline the given duration from now
    pub fn after(limit: Duration) -> Self {
        Self {
            at: tokio::time::Instant::now() + limit,
            limit,
        }
    }

    /// Check whether the deadline has passed
    pub fn is_expired(&self) -> bool {
        tokio::time::Instant::now() >= self.at
    }

    /// Get the remaining time budget
    ///
    /// Returns `None` once the deadline has passed.
    pub fn remaining(&self) -> Option<Duration> {
        let now = tokio::time::Instant::now();
        if now >= self.at {
            None
        } else {
            Some(self.at.duration_since(now))
        }
    }

    /// Get the duration this deadline was created with
    pub fn limit(&self) -> Duration {
        self.limit
    }

    /// Execute an operation within the remaining time budget
    ///
    /// An already-expired deadline fails with [`FlowError::Timeout`] without
    /// polling the operation.
    pub async fn run<F, T, E>(&self, operation: F) -> FlowResult<T, E>
    where
        F: Future<Output = std::result::Result<T, E>>,
    {
        match self.remaining() {
            Some(rest) => with_timeout(rest, operation).await,
            None => Err(FlowError::Timeout { limit: self.limit }),
        }
    }
}
