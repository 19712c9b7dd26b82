use crate::Result;
use futures::future::BoxFuture;

const LOG_TARGET: &str = "  fallback";

/// A named acquisition strategy for one metric.
pub type Strategy<'a, T> = (&'static str, BoxFuture<'a, Result<T>>);

/// Try strategies in order and return the first success.
///
/// Futures are lazy, so later strategies perform no work unless every
/// earlier one has failed. When the whole chain is exhausted the caller's
/// default is returned; exhaustion is never an error.
pub async fn first_success<T>(what: &str, strategies: Vec<Strategy<'_, T>>, default: T) -> T {
    for (name, strategy) in strategies {
        match strategy.await {
            Ok(value) => {
                log::debug!(target: LOG_TARGET, "Resolved {what} via '{name}'");
                return value;
            }
            Err(e) => {
                log::debug!(target: LOG_TARGET, "Strategy '{name}' for {what} failed: {e:#}");
            }
        }
    }

    log::debug!(target: LOG_TARGET, "All strategies for {what} exhausted, using default");
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use ohno::app_err;

    #[tokio::test]
    async fn first_strategy_wins() {
        let result = first_success(
            "test metric",
            vec![
                ("one", Box::pin(async { Ok(1_u64) })),
                ("two", Box::pin(async { Ok(2_u64) })),
            ],
            0,
        )
        .await;

        assert_eq!(result, 1);
    }

    #[tokio::test]
    async fn failure_falls_through_to_next() {
        let result = first_success(
            "test metric",
            vec![
                ("one", Box::pin(async { Err(app_err!("nope")) })),
                ("two", Box::pin(async { Ok(2_u64) })),
            ],
            0,
        )
        .await;

        assert_eq!(result, 2);
    }

    #[tokio::test]
    async fn exhaustion_yields_the_default() {
        let result = first_success(
            "test metric",
            vec![
                ("one", Box::pin(async { Err(app_err!("nope")) })),
                ("two", Box::pin(async { Err(app_err!("still nope")) })),
            ],
            42_u64,
        )
        .await;

        assert_eq!(result, 42);
    }

    #[tokio::test]
    async fn later_strategies_are_not_polled_after_a_success() {
        let polled = AtomicUsize::new(0);

        let result = first_success(
            "test metric",
            vec![
                ("one", Box::pin(async { Ok(7_u64) })),
                (
                    "two",
                    Box::pin(async {
                        let _ = polled.fetch_add(1, Ordering::SeqCst);
                        Ok(8_u64)
                    }),
                ),
            ],
            0,
        )
        .await;

        assert_eq!(result, 7);
        assert_eq!(polled.load(Ordering::SeqCst), 0);
    }
}
