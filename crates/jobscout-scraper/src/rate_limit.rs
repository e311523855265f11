//! Retry utilities.
//!
//! Two policies live here:
//!
//! - [`retry_on_overload`]: the fixed-wait loop used while paginating a
//!   listing. Only [`CrawlError::Overloaded`] is retried, against one retry
//!   budget for the whole crawl; every other error is returned at once.
//! - [`retry_with_backoff`]: exponential backoff used by the work queue for
//!   per-item handlers, covering every [`CrawlError::is_transient`] failure.

use std::future::Future;
use std::time::Duration;

use reqwest::StatusCode;

use crate::error::CrawlError;

/// The status the site answers with when it sheds load.
pub const OVERLOADED_STATUS: StatusCode = StatusCode::GATEWAY_TIMEOUT;

/// Fixed-interval retry policy for listing pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Retries after the first attempt; the page is fetched at most
    /// `max_retries + 1` times.
    pub max_retries: u32,
    /// Wait before each retry.
    pub wait: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            wait: Duration::from_secs(3),
        }
    }
}

impl RateLimitPolicy {
    #[must_use]
    pub fn from_config(config: &jobscout_core::AppConfig) -> Self {
        Self {
            max_retries: config.rate_limit_retries,
            wait: Duration::from_millis(config.rate_limit_wait_ms),
        }
    }
}

/// Runs `operation`, retrying on [`CrawlError::Overloaded`] after a fixed
/// wait.
///
/// `retries_used` is the caller's running count and is shared by every
/// page of one crawl, so `policy.max_retries` bounds the whole crawl rather
/// than each page.
pub(crate) async fn retry_on_overload<T, F, Fut>(
    policy: &RateLimitPolicy,
    retries_used: &mut u32,
    mut operation: F,
) -> Result<T, CrawlError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CrawlError>>,
{
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(CrawlError::Overloaded { url }) if *retries_used < policy.max_retries => {
                *retries_used += 1;
                tracing::info!(
                    %url,
                    retry = *retries_used,
                    max_retries = policy.max_retries,
                    wait_ms = u64::try_from(policy.wait.as_millis()).unwrap_or(u64::MAX),
                    "encountered rate limit, waiting before retry"
                );
                tokio::time::sleep(policy.wait).await;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// The wait before retry `n` (1-based) is `backoff_base_ms * 2^(n-1)`,
/// capped at 30 s. Non-transient errors are returned immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, CrawlError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CrawlError>>,
{
    const MAX_DELAY_MS: u64 = 30_000;
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !err.is_transient() || attempt >= max_retries {
                    return Err(err);
                }
                let delay_ms = backoff_base_ms
                    .saturating_mul(1u64 << attempt.min(20))
                    .min(MAX_DELAY_MS);
                attempt += 1;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient error, retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
