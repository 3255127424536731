//! Retry with exponential back-off and jitter for page fetches.
//!
//! Only transport-level failures are retried. A locator that never appears or
//! a 404 will not fix itself, so those surface immediately and let the
//! resolver decide what the failure means for the store.

use std::future::Future;
use std::time::Duration;

use crate::error::NavError;

/// Upper bound on any single back-off sleep.
const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
///
/// **Retriable:** HTTP 429, connect failures, request timeouts, and 5xx
/// responses.
///
/// **Not retriable:** everything else, including wait timeouts on locators,
/// invalid locators or URLs, other 4xx statuses, and a closed session.
pub(crate) fn is_retriable(err: &NavError) -> bool {
    match err {
        NavError::RateLimited { .. } => true,
        NavError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        NavError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        NavError::Timeout { .. }
        | NavError::InvalidLocator { .. }
        | NavError::InvalidUrl { .. }
        | NavError::NoPage
        | NavError::SessionClosed => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors.
///
/// The n-th retry sleeps `backoff_base_ms * 2^(n-1)` ms with ±25 % jitter,
/// capped at 30 s. A 429 with a `Retry-After` longer than that delay waits
/// for `Retry-After` instead, under the same cap.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, NavError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, NavError>>,
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
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (computed as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                let requested = match &err {
                    NavError::RateLimited {
                        retry_after_secs, ..
                    } => retry_after_secs.saturating_mul(1_000),
                    _ => 0,
                };
                let delay_ms = jittered.max(requested).min(MAX_DELAY_MS);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient fetch error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
