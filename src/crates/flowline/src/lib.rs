//! Async control-flow combinators for fallible operations
//!
//! This crate provides a small set of reusable primitives for sequencing
//! and joining async operations that can fail.
//!
//! # Modules
//!
//! - `delay` - Validated timer-backed pauses
//! - `error` - Failure taxonomy shared by every combinator
//! - `fanout` - Concurrent all-or-nothing joins and first-completion races
//! - `retry` - Retry policies with backoff and the sequential retry driver
//! - `timeout` - Timeout wrappers and reusable deadlines
//!
//! # Example
//!
//! ```rust,ignore
//! use flowline::{with_retry, with_timeout, RetryPolicy};
//! use std::time::Duration;
//!
//! async fn call_api_with_retry() -> Result<String, flowline::FlowError<String>> {
//!     let policy = RetryPolicy::new(3)
//!         .with_exponential_backoff(0.5, 2.0, 30.0);
//!
//!     with_retry(&policy, || async {
//!         with_timeout(Duration::from_secs(10), fetch_remote()).await
//!             .map_err(|e| e.to_string())
//!     })
//!     .await
//! }
//! ```

pub mod delay;
pub mod error;
pub mod fanout;
pub mod retry;
pub mod timeout;

pub use delay::delay;
pub use error::{FlowError, FlowResult};
pub use fanout::{all_or_fail, race_first};
pub use retry::{with_retry, with_retry_and_timeout, with_retry_if, Backoff, RetryPolicy};
pub use timeout::{with_timeout, Deadline};

/// Get version information
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        let v = version();
        assert!(!v.is_empty());
    }
}
