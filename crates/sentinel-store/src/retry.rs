//! Retry with exponential back-off and jitter for store requests.
//!
//! Only transient failures are retried. API-level rejections and decode
//! errors are returned immediately. Calls whose effect is not safe to repeat
//! use [`RetryPolicy::Unsent`], which only retries failures that prove the
//! server never acted on the request.

use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;

/// Which failures a request may be re-sent after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RetryPolicy {
    /// Repeating the request is harmless: every transient failure is retried.
    Transient,
    /// The request advances server state (scroll cursors, deletes, inserts
    /// with generated ids). Only connection failures and 429 are retried; a
    /// timeout or 5xx may have landed and is returned as-is.
    Unsent,
}

impl RetryPolicy {
    pub(crate) fn allows(self, err: &StoreError) -> bool {
        match self {
            RetryPolicy::Transient => is_retriable(err),
            RetryPolicy::Unsent => is_unsent(err),
        }
    }
}

/// Returns `true` when the request cannot have been acted on by the server.
fn is_unsent(err: &StoreError) -> bool {
    match err {
        StoreError::Http(e) => e.is_connect(),
        StoreError::Api { status, .. } => *status == 429,
        StoreError::Deserialize { .. } | StoreError::Encode { .. } | StoreError::InvalidUrl { .. } => {
            false
        }
    }
}

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connection failures, HTTP 5xx, HTTP 429.
///
/// **Not retriable:** other 4xx responses, encode/decode failures, bad URLs.
pub(crate) fn is_retriable(err: &StoreError) -> bool {
    match err {
        StoreError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        StoreError::Api { status, .. } => *status == 429 || *status >= 500,
        StoreError::Deserialize { .. } | StoreError::Encode { .. } | StoreError::InvalidUrl { .. } => {
            false
        }
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on errors
/// `policy` allows.
///
/// Delay before attempt `n + 1` is `backoff_base_ms × 2ⁿ⁻¹ ± 25 %`, capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !policy.allows(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "store transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    fn api_err(status: u16) -> StoreError {
        StoreError::Api {
            status,
            body: String::new(),
        }
    }

    #[test]
    fn server_errors_and_throttling_are_retriable() {
        assert!(is_retriable(&api_err(503)));
        assert!(is_retriable(&api_err(429)));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&api_err(400)));
        assert!(!is_retriable(&api_err(404)));
    }

    #[test]
    fn decode_errors_are_not_retriable() {
        let source = serde_json::from_str::<()>("nope").unwrap_err();
        assert!(!is_retriable(&StoreError::Deserialize {
            context: "test".to_owned(),
            source,
        }));
    }

    #[test]
    fn unsent_policy_only_retries_throttling() {
        assert!(RetryPolicy::Unsent.allows(&api_err(429)));
        assert!(!RetryPolicy::Unsent.allows(&api_err(503)));
        assert!(!RetryPolicy::Unsent.allows(&api_err(500)));
        assert!(RetryPolicy::Transient.allows(&api_err(503)));
    }

    #[tokio::test]
    async fn unsent_policy_returns_server_error_after_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(RetryPolicy::Unsent, 3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(api_err(502))
            }
        })
        .await;
        assert!(matches!(result, Err(StoreError::Api { status: 502, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(RetryPolicy::Transient, 3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(api_err(502))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(RetryPolicy::Transient, 2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(api_err(500))
            }
        })
        .await;
        assert!(matches!(result, Err(StoreError::Api { status: 500, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3, "1 attempt + 2 retries");
    }

    #[tokio::test]
    async fn does_not_retry_bad_request() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(RetryPolicy::Transient, 3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(api_err(400))
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
