//! Concurrent fan-out combinators
//!
//! Both combinators drive their operations through a single
//! completion-ordered stream: every operation starts immediately, and
//! completions are observed in real-time order rather than input order.

use futures::stream::{FuturesUnordered, StreamExt};
use std::future::Future;
use tracing::debug;

use crate::error::{FlowError, FlowResult};

/// Drive all operations concurrently, failing fast on the first failure
///
/// When every operation succeeds, the values are returned in **input order**,
/// regardless of completion order. When any operation fails, the first
/// failure in **completion order** wins: it is returned as
/// [`FlowError::Operation`] carrying the failed operation's input index, and
/// the remaining operations are dropped without being surfaced.
///
/// Empty input succeeds immediately with an empty vector.
pub async fn all_or_fail<I, Fut, T, E>(operations: I) -> FlowResult<Vec<T>, E>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let indexed: Vec<_> = operations
        .into_iter()
        .enumerate()
        .map(|(index, operation)| async move { (index, operation.await) })
        .collect();

    let total = indexed.len();
    let mut slots: Vec<Option<T>> = (0..total).map(|_| None).collect();
    let mut pending: FuturesUnordered<_> = indexed.into_iter().collect();

    while let Some((index, outcome)) = pending.next().await {
        match outcome {
            Ok(value) => slots[index] = Some(value),
            Err(error) => {
                debug!(
                    index,
                    completed = total - pending.len() - 1,
                    "fan-out operation failed, dropping the rest"
                );
                return Err(FlowError::Operation { index, error });
            }
        }
    }

    Ok(slots
        .into_iter()
        .map(|slot| slot.expect("drained stream fills every slot"))
        .collect())
}

/// Resolve with the outcome of whichever operation completes first
///
/// The chronologically first completion wins, success or failure; a failure
/// carries the winner's input index. The losing operations are dropped.
///
/// # Errors
///
/// Empty input fails with [`FlowError::InvalidArgument`] immediately, without
/// polling anything, rather than hanging.
pub async fn race_first<I, Fut, T, E>(operations: I) -> FlowResult<T, E>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut pending: FuturesUnordered<_> = operations
        .into_iter()
        .enumerate()
        .map(|(index, operation)| async move { (index, operation.await) })
        .collect();

    match pending.next().await {
        Some((_, Ok(value))) => Ok(value),
        Some((index, Err(error))) => Err(FlowError::Operation { index, error }),
        None => Err(FlowError::InvalidArgument(
            "race_first requires at least one operation".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Ready;
    use std::time::Duration;

    fn op(delay_ms: u64, outcome: Result<u32, String>) -> impl Future<Output = Result<u32, String>> {
        async move {
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            outcome
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_or_fail_empty_input_succeeds_immediately() {
        let start = tokio::time::Instant::now();
        let operations: Vec<Ready<Result<u32, String>>> = Vec::new();

        let result = all_or_fail(operations).await;

        assert_eq!(result.unwrap(), Vec::<u32>::new());
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_or_fail_preserves_input_order() {
        // Completion order is the reverse of input order.
        let operations = vec![
            op(30, Ok(1)),
            op(20, Ok(2)),
            op(10, Ok(3)),
        ];

        let result = all_or_fail(operations).await;

        assert_eq!(result.unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_or_fail_runs_operations_concurrently() {
        let start = tokio::time::Instant::now();
        let operations = vec![
            op(100, Ok(1)),
            op(100, Ok(2)),
            op(100, Ok(3)),
        ];

        let result = all_or_fail(operations).await;

        assert!(result.is_ok());
        // Sequential execution would take 300ms.
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(start.elapsed() < Duration::from_millis(150));
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_or_fail_first_failure_in_completion_order_wins() {
        let operations = vec![
            op(50, Ok(1)),
            op(10, Err("b failed".to_string())),
            op(30, Err("c failed".to_string())),
        ];

        let result = all_or_fail(operations).await;

        match result.unwrap_err() {
            FlowError::Operation { index, error } => {
                assert_eq!(index, 1);
                assert_eq!(error, "b failed");
            }
            _ => panic!("Expected operation failure"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_or_fail_single_failure_discards_successes() {
        let operations = vec![
            op(10, Ok(1)),
            op(20, Ok(2)),
            op(30, Err("late failure".to_string())),
        ];

        let result = all_or_fail(operations).await;

        match result.unwrap_err() {
            FlowError::Operation { index, error } => {
                assert_eq!(index, 2);
                assert_eq!(error, "late failure");
            }
            _ => panic!("Expected operation failure"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_first_empty_input_fails_without_hanging() {
        let start = tokio::time::Instant::now();
        let operations: Vec<Ready<Result<u32, String>>> = Vec::new();

        let result = race_first(operations).await;

        match result.unwrap_err() {
            FlowError::InvalidArgument(reason) => {
                assert!(reason.contains("at least one operation"));
            }
            _ => panic!("Expected invalid argument"),
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_first_fastest_success_wins() {
        let operations = vec![
            op(50, Ok(1)),
            op(10, Ok(42)),
        ];

        let result = race_first(operations).await;

        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_race_first_fastest_failure_wins() {
        let operations = vec![
            op(10, Err("fast failure".to_string())),
            op(50, Ok(1)),
        ];

        let result = race_first(operations).await;

        match result.unwrap_err() {
            FlowError::Operation { index, error } => {
                assert_eq!(index, 0);
                assert_eq!(error, "fast failure");
            }
            _ => panic!("Expected operation failure"),
        }
    }
}
