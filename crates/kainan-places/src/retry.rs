//! Retry with exponential back-off and jitter for the Places client.
//!
//! Only transient failures are retried. Quota and denial errors stop
//! immediately so a billing rejection is never amplified.

use std::future::Future;
use std::time::Duration;

use crate::error::PlacesError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** timeouts, connect failures, HTTP 5xx, and the Places
/// `UNKNOWN_ERROR` status (documented as a transient server fault).
///
/// Everything else is a hard stop.
pub(crate) fn is_retriable(err: &PlacesError) -> bool {
    match err {
        PlacesError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PlacesError::ApiError { status, .. } => status == "UNKNOWN_ERROR",
        PlacesError::QuotaExceeded(_)
        | PlacesError::RequestDenied(_)
        | PlacesError::InvalidRequest(_)
        | PlacesError::NotFound(_)
        | PlacesError::Deserialize { .. }
        | PlacesError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The n-th retry waits `backoff_base_ms * 2^(n-1)` ms ± 25 % jitter, capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PlacesError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlacesError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
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
                    "Places transient error, retrying after back-off"
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

    fn deserialize_err() -> PlacesError {
        let src = serde_json::from_str::<()>("invalid").unwrap_err();
        PlacesError::Deserialize {
            context: "test".to_owned(),
            source: src,
        }
    }

    #[test]
    fn quota_and_denial_are_not_retriable() {
        assert!(!is_retriable(&PlacesError::QuotaExceeded("limit".to_owned())));
        assert!(!is_retriable(&PlacesError::RequestDenied("key".to_owned())));
        assert!(!is_retriable(&deserialize_err()));
    }

    #[test]
    fn unknown_error_status_is_retriable() {
        assert!(is_retriable(&PlacesError::ApiError {
            status: "UNKNOWN_ERROR".to_owned(),
            message: String::new(),
        }));
        assert!(!is_retriable(&PlacesError::ApiError {
            status: "SOMETHING_ELSE".to_owned(),
            message: String::new(),
        }));
    }

    #[tokio::test]
    async fn does_not_retry_quota_exceeded() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(PlacesError::QuotaExceeded("OVER_QUERY_LIMIT".to_owned()))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(PlacesError::QuotaExceeded(_))));
    }

    #[tokio::test]
    async fn retries_transient_status_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err::<u32, _>(PlacesError::ApiError {
                        status: "UNKNOWN_ERROR".to_owned(),
                        message: "try again".to_owned(),
                    })
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
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>(PlacesError::ApiError {
                    status: "UNKNOWN_ERROR".to_owned(),
                    message: String::new(),
                })
            }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3, "1 attempt + 2 retries");
    }
}
