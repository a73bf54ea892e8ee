//! Query timeout helpers
//!
//! Every store round trip runs under a deadline so a stalled database surfaces
//! as an error instead of a hung request.

use std::time::Duration;
use tokio::time::timeout;

use super::errors::{StoreError, StoreResult};

/// Default timeout for database queries (5 seconds)
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for multi-statement transactions (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Execute a database operation with a timeout
///
/// # Example
///
/// ```no_run
/// use tourney::db::timeouts::{with_timeout, DEFAULT_QUERY_TIMEOUT};
/// # use sqlx::PgPool;
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
///
/// let row = with_timeout(
///     DEFAULT_QUERY_TIMEOUT,
///     sqlx::query("SELECT * FROM users WHERE id = $1")
///         .bind(1_i64)
///         .fetch_optional(pool)
/// ).await?;
///
/// # Ok(())
/// # }
/// ```
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> StoreResult<T>
where
    F: std::future::Future<Output = Result<T, sqlx::Error>>,
{
    match timeout(duration, future).await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(e)) => Err(StoreError::Database(e)),
        Err(_) => Err(StoreError::Timeout(duration)),
    }
}

/// Deadline for a transaction whose statements each run under `query_timeout`
///
/// Never shorter than [`DEFAULT_TRANSACTION_TIMEOUT`].
pub fn transaction_timeout(query_timeout: Duration) -> Duration {
    DEFAULT_TRANSACTION_TIMEOUT.max(query_timeout * 2)
}

/// Execute a multi-step store operation with a timeout
///
/// Unlike [`with_timeout`], the future already yields store errors, which lets
/// a whole transaction run under one deadline.
pub async fn within<F, T>(duration: Duration, future: F) -> StoreResult<T>
where
    F: std::future::Future<Output = StoreResult<T>>,
{
    timeout(duration, future)
        .await
        .map_err(|_| StoreError::Timeout(duration))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_timeout_constants() {
        assert_eq!(DEFAULT_QUERY_TIMEOUT.as_secs(), 5);
        assert_eq!(DEFAULT_TRANSACTION_TIMEOUT.as_secs(), 10);
    }

    #[test]
    fn test_transaction_timeout_scales_with_query_timeout() {
        assert_eq!(transaction_timeout(DEFAULT_QUERY_TIMEOUT), DEFAULT_TRANSACTION_TIMEOUT);
        assert_eq!(transaction_timeout(Duration::from_secs(1)), DEFAULT_TRANSACTION_TIMEOUT);
        assert_eq!(transaction_timeout(Duration::from_secs(30)), Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_completed_operation_passes_through() {
        let value = with_timeout(DEFAULT_QUERY_TIMEOUT, async { Ok::<_, sqlx::Error>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_database_error_is_wrapped() {
        let err = with_timeout(DEFAULT_QUERY_TIMEOUT, async {
            Err::<(), _>(sqlx::Error::RowNotFound)
        })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(sqlx::Error::RowNotFound)));
    }

    #[tokio::test]
    async fn test_slow_operation_times_out() {
        let err = with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, sqlx::Error>(())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Timeout(_)));
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_within_keeps_store_errors() {
        let err = within(DEFAULT_TRANSACTION_TIMEOUT, async {
            Err::<(), _>(StoreError::Corrupt("bad state".to_string()))
        })
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));
    }
}
