//! HTTP client for the paginated data API.
//!
//! Wraps an offset/size-paginated JSON endpoint behind the [`PageSource`]
//! port. Includes a token-bucket rate limiter and exponential-backoff retry
//! for transport errors and retryable statuses; the sampling core itself
//! never retries, so this boundary is where that policy lives.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use backoff::ExponentialBackoff;
use reqwest::Client;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{ApiConfig, Record, RetryConfig};
use crate::domain::ports::PageSource;

/// Token-bucket rate limiter.
///
/// Allows up to `capacity` requests per `window`. When the bucket is
/// exhausted, [`acquire`](RateLimiter::acquire) sleeps until the window
/// resets and a token becomes available.
#[derive(Debug)]
pub struct RateLimiter {
    /// Maximum tokens in the bucket.
    capacity: u32,
    /// Current available tokens.
    tokens: u32,
    /// Duration of the refill window.
    window: Duration,
    /// When the current window started.
    window_start: Instant,
}

impl RateLimiter {
    /// Create a new rate limiter with the given capacity and window.
    pub fn new(capacity: u32, window: Duration) -> Self {
        Self {
            capacity,
            tokens: capacity,
            window,
            window_start: Instant::now(),
        }
    }

    /// Acquire a single token, sleeping if necessary.
    ///
    /// If the current window has elapsed, the bucket is refilled. If no
    /// tokens are available, this method sleeps until the window resets.
    pub async fn acquire(&mut self) {
        let elapsed = self.window_start.elapsed();
        if elapsed >= self.window {
            self.tokens = self.capacity;
            self.window_start = Instant::now();
        }

        if self.tokens > 0 {
            self.tokens -= 1;
        } else {
            let remaining = self.window.saturating_sub(elapsed);
            tracing::warn!(
                sleep_ms = remaining.as_millis() as u64,
                "data API rate limit reached, sleeping"
            );
            tokio::time::sleep(remaining).await;
            self.tokens = self.capacity - 1;
            self.window_start = Instant::now();
        }
    }
}

/// A failed page request, classified for the retry loop.
#[derive(Debug)]
enum FetchFailure {
    /// Worth retrying: transport errors, 429, and server errors.
    Transient(DomainError),
    /// Not worth retrying: client errors, malformed payloads.
    Fatal(DomainError),
}

impl FetchFailure {
    fn into_inner(self) -> DomainError {
        match self {
            Self::Transient(err) | Self::Fatal(err) => err,
        }
    }
}

/// HTTP client for an offset-paginated tabular data API.
///
/// The endpoint is expected to return a JSON array of objects for
/// `GET {base_url}?size={size}&offset={offset}`, and an empty array at or
/// after the end of data. Anything that is not an array is a fatal error:
/// the core assumes a reliable page stream.
#[derive(Debug, Clone)]
pub struct DataApiClient {
    /// The underlying HTTP client.
    http: Client,
    /// Dataset endpoint URL.
    base_url: String,
    /// Shared rate limiter.
    rate_limiter: Arc<Mutex<RateLimiter>>,
    /// Retry policy applied per page.
    retry: RetryConfig,
}

impl DataApiClient {
    pub fn new(base_url: impl Into<String>, requests_per_minute: u32, retry: RetryConfig) -> Self {
        let rate_limiter = RateLimiter::new(requests_per_minute.max(1), Duration::from_secs(60));
        Self {
            http: Client::new(),
            base_url: base_url.into(),
            rate_limiter: Arc::new(Mutex::new(rate_limiter)),
            retry,
        }
    }

    pub fn from_config(api: &ApiConfig, retry: &RetryConfig) -> Self {
        Self::new(api.base_url.clone(), api.requests_per_minute, retry.clone())
    }

    fn backoff_policy(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_millis(self.retry.initial_backoff_ms),
            max_interval: Duration::from_millis(self.retry.max_backoff_ms),
            // Attempts are bounded by max_retries, not elapsed time.
            max_elapsed_time: None,
            ..ExponentialBackoff::default()
        }
    }

    /// Issue a single page request, without retry.
    async fn request_page(&self, offset: u64, size: u64) -> Result<Vec<Record>, FetchFailure> {
        self.rate_limiter.lock().await.acquire().await;

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("size", size), ("offset", offset)])
            .send()
            .await
            .map_err(|e| {
                FetchFailure::Transient(DomainError::SourceFailed(format!(
                    "page request failed: {e}"
                )))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let err = DomainError::SourceFailed(format!("data API returned {status}: {body}"));
            return if status.as_u16() == 429 || status.is_server_error() {
                Err(FetchFailure::Transient(err))
            } else {
                Err(FetchFailure::Fatal(err))
            };
        }

        let payload: Value = resp.json().await.map_err(|e| {
            FetchFailure::Fatal(DomainError::SerializationError(format!(
                "data API payload is not valid JSON: {e}"
            )))
        })?;

        let Value::Array(rows) = payload else {
            return Err(FetchFailure::Fatal(DomainError::SourceFailed(
                "data API payload is not a JSON array".to_string(),
            )));
        };

        rows.into_iter()
            .map(|row| match row {
                Value::Object(fields) => Ok(Record::from(fields)),
                other => Err(FetchFailure::Fatal(DomainError::SourceFailed(format!(
                    "data API row is not an object: {other}"
                )))),
            })
            .collect()
    }
}

#[async_trait]
impl PageSource for DataApiClient {
    async fn fetch_page(&self, offset: u64, size: u64) -> DomainResult<Vec<Record>> {
        let attempts = AtomicU32::new(0);

        backoff::future::retry_notify(
            self.backoff_policy(),
            || async {
                self.request_page(offset, size).await.map_err(|failure| {
                    let retryable = matches!(failure, FetchFailure::Transient(_));
                    if retryable && attempts.fetch_add(1, Ordering::SeqCst) < self.retry.max_retries
                    {
                        backoff::Error::transient(failure.into_inner())
                    } else {
                        backoff::Error::permanent(failure.into_inner())
                    }
                })
            },
            |err, wait: Duration| {
                tracing::warn!(
                    offset,
                    error = %err,
                    retry_in_ms = wait.as_millis() as u64,
                    "retrying page fetch"
                );
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_creation() {
        let rl = RateLimiter::new(100, Duration::from_secs(60));
        assert_eq!(rl.capacity, 100);
        assert_eq!(rl.tokens, 100);
    }

    #[tokio::test]
    async fn test_rate_limiter_acquire_decrements_tokens() {
        let mut rl = RateLimiter::new(5, Duration::from_secs(60));
        rl.acquire().await;
        assert_eq!(rl.tokens, 4);
        rl.acquire().await;
        assert_eq!(rl.tokens, 3);
    }

    #[test]
    fn test_client_from_config() {
        let api = ApiConfig {
            base_url: "https://example.test/data".to_string(),
            page_size: 500,
            requests_per_minute: 10,
        };
        let client = DataApiClient::from_config(&api, &RetryConfig::default());
        assert_eq!(client.base_url, "https://example.test/data");
    }

    #[test]
    fn test_zero_rate_limit_clamped_to_one() {
        let client = DataApiClient::new("https://example.test", 0, RetryConfig::default());
        // A zero-capacity bucket would deadlock acquire().
        let limiter = client.rate_limiter.try_lock().unwrap();
        assert_eq!(limiter.capacity, 1);
    }
}
