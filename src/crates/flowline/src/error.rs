//! Failure taxonomy shared by every combinator
//!
//! All combinators in this crate fail with [`FlowError`], which keeps the
//! three failure classes distinguishable: rejected input, a failure from a
//! caller-supplied operation, and an elapsed timeout.

use std::time::Duration;
use thiserror::Error;

/// Result type for combinator operations
pub type FlowResult<T, E> = std::result::Result<T, FlowError<E>>;

/// Errors produced by the combinators in this crate
#[derive(Debug, Error)]
pub enum FlowError<E> {
    /// Malformed input, rejected before any operation was polled
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A caller-supplied operation failed; its error is carried unchanged.
    ///
    /// `index` is the operation's position in the input for the fan-out
    /// combinators and 0 for single-operation combinators.
    #[error("operation {index} failed: {error}")]
    Operation { index: usize, error: E },

    /// The timer elapsed before the operation completed
    #[error("timed out after {limit:?}")]
    Timeout { limit: Duration },
}

impl<E> FlowError<E> {
    /// Wrap a single operation's failure
    pub fn operation(error: E) -> Self {
        Self::Operation { index: 0, error }
    }

    /// Check whether this failure came from an elapsed timer
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Extract the underlying operation error, if there is one
    pub fn into_source(self) -> Option<E> {
        match self {
            Self::Operation { error, .. } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_formats() {
        let invalid: FlowError<String> = FlowError::InvalidArgument("bad input".to_string());
        assert_eq!(invalid.to_string(), "invalid argument: bad input");

        let failed: FlowError<&str> = FlowError::Operation {
            index: 2,
            error: "connection refused",
        };
        assert_eq!(failed.to_string(), "operation 2 failed: connection refused");

        let timed_out: FlowError<String> = FlowError::Timeout {
            limit: Duration::from_secs(5),
        };
        assert_eq!(timed_out.to_string(), "timed out after 5s");
    }

    #[test]
    fn test_is_timeout() {
        let timed_out: FlowError<String> = FlowError::Timeout {
            limit: Duration::from_millis(10),
        };
        assert!(timed_out.is_timeout());

        let failed: FlowError<String> = FlowError::operation("boom".to_string());
        assert!(!failed.is_timeout());
    }

    #[test]
    fn test_into_source() {
        let failed: FlowError<&str> = FlowError::operation("boom");
        assert_eq!(failed.into_source(), Some("boom"));

        let timed_out: FlowError<&str> = FlowError::Timeout {
            limit: Duration::from_secs(1),
        };
        assert_eq!(timed_out.into_source(), None);
    }

    #[test]
    fn test_operation_helper_uses_index_zero() {
        let failed: FlowError<&str> = FlowError::operation("boom");
        match failed {
            FlowError::Operation { index, error } => {
                assert_eq!(index, 0);
                assert_eq!(error, "boom");
            }
            _ => panic!("Expected operation failure"),
        }
    }
}
