//! Shared retry/backoff policy for rate-limited HTTP backends.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::warn;

use crate::{ProviderKind, Result, SearchError};

/// Exponential backoff policy applied to rate-limited attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay before retry number `attempt` (0-indexed): 1s, 2s, 4s, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.initial_backoff * 2u32.saturating_pow(attempt)
    }
}

/// Runs `op`, retrying on [`SearchError::RateLimited`] with exponential
/// backoff until the policy is exhausted.
///
/// Exhausted retries escalate to [`SearchError::RetryExhausted`] carrying the
/// last backend message. All other errors surface immediately.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    kind: ProviderKind,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(SearchError::RateLimited { status, message }) => {
                if attempt >= policy.max_retries {
                    return Err(SearchError::RetryExhausted {
                        attempts: attempt + 1,
                        message,
                    });
                }
                let delay = policy.backoff(attempt);
                warn!(
                    provider = %kind,
                    status = ?status,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "rate limited, backing off"
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn rate_limited() -> SearchError {
        SearchError::RateLimited {
            status: Some(429),
            message: "Too Many Requests".to_string(),
        }
    }

    #[test]
    fn test_backoff_ladder() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(0), Duration::from_secs(1));
        assert_eq!(policy.backoff(1), Duration::from_secs(2));
        assert_eq!(policy.backoff(2), Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_success_first_attempt_no_delay() {
        let policy = RetryPolicy::default();
        let result = with_retry(&policy, ProviderKind::Serper, || async { Ok(42) }).await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn test_three_rate_limits_then_success() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);
        let start = tokio::time::Instant::now();

        let result = with_retry(&policy, ProviderKind::Serper, || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 3 {
                    Err(rate_limited())
                } else {
                    Ok("results")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "results");
        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        // Three backoffs observed: 1s + 2s + 4s of virtual time.
        assert_eq!(start.elapsed(), Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_escalates() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);

        let result: Result<()> = with_retry(&policy, ProviderKind::Google, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(rate_limited()) }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 4);
        match result.unwrap_err() {
            SearchError::RetryExhausted { attempts, message } => {
                assert_eq!(attempts, 4);
                assert_eq!(message, "Too Many Requests");
            }
            other => panic!("expected RetryExhausted, got: {}", other),
        }
    }

    #[tokio::test]
    async fn test_non_retryable_error_surfaces_immediately() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);

        let result: Result<()> = with_retry(&policy, ProviderKind::Brave, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(SearchError::Backend {
                    status: Some(500),
                    message: "internal error".to_string(),
                })
            }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), SearchError::Backend { .. }));
    }

    #[tokio::test]
    async fn test_timeout_not_retried() {
        let policy = RetryPolicy::default();
        let attempts = AtomicU32::new(0);

        let result: Result<()> = with_retry(&policy, ProviderKind::Google, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(SearchError::Timeout(5000)) }
        })
        .await;

        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err(), SearchError::Timeout(5000)));
    }
}
