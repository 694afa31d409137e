//! Validated timer-backed pauses
//!
//! Durations are expressed in fractional seconds, matching the retry policy
//! types. Validation happens before any timer is scheduled.

use std::time::Duration;

use crate::error::{FlowError, FlowResult};

/// Pause for the given number of seconds
///
/// Resolves successfully, carrying no value, no earlier than `seconds` after
/// invocation. A zero delay still yields to the scheduler once.
///
/// # Errors
///
/// Returns `InvalidArgument` immediately, without scheduling a timer, when
/// `seconds` is negative or not finite.
///
/// # Example
///
/// ```rust,ignore
/// use flowline::delay;
///
/// delay::<String>(0.25).await?;
/// ```
pub async fn delay<E>(seconds: f64) -> FlowResult<(), E> {
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(FlowError::InvalidArgument(format!(
            "delay requires a finite, non-negative duration, got {}",
            seconds
        )));
    }

    tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
    Ok(())
}
