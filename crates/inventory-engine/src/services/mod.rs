//! Engine services orchestrating repositories inside transactions.

pub mod allocation;
pub mod catalog;
pub mod query;
pub mod returns;

use std::future::Future;
use std::time::Duration;

use domain::InventoryError;
use persistence::db::is_retryable;

/// Bounded retry attempts for transient transaction failures.
const TX_RETRY_ATTEMPTS: u32 = 3;

/// Base backoff between retries; doubled per attempt.
const TX_RETRY_BACKOFF_MS: u64 = 50;

/// Runs a transactional operation, retrying serialization failures and
/// deadlocks with backoff.
///
/// Business errors are deterministic and pass through untouched; only
/// transient storage conflicts are re-attempted.
pub(crate) async fn with_tx_retry<T, F, Fut>(
    operation: &str,
    mut run: F,
) -> Result<T, InventoryError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, InventoryError>>,
{
    let mut attempt: u32 = 0;
    loop {
        match run().await {
            Err(InventoryError::StorageUnavailable(err))
                if is_retryable(&err) && attempt + 1 < TX_RETRY_ATTEMPTS =>
            {
                attempt += 1;
                tracing::warn!(
                    operation,
                    attempt,
                    error = %err,
                    "transient transaction conflict, retrying"
                );
                tokio::time::sleep(Duration::from_millis(TX_RETRY_BACKOFF_MS << attempt)).await;
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_with_tx_retry_passes_through_success() {
        let result = with_tx_retry("noop", || async { Ok::<_, InventoryError>(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_with_tx_retry_does_not_retry_business_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_tx_retry("noop", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(InventoryError::AlreadyReturned {
                    allocation_id: uuid::Uuid::new_v4(),
                })
            }
        })
        .await;

        assert!(matches!(
            result,
            Err(InventoryError::AlreadyReturned { .. })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_with_tx_retry_does_not_retry_plain_storage_errors() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_tx_retry("noop", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(InventoryError::StorageUnavailable(sqlx::Error::PoolClosed)) }
        })
        .await;

        assert!(matches!(
            result,
            Err(InventoryError::StorageUnavailable(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
