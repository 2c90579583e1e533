//! Page fetching with timeout and exponential backoff retry logic.
//!
//! # Architecture
//!
//! - [`FetchPage`]: core trait, "give me the body behind this URL"
//! - [`HttpFetcher`]: `reqwest`-backed implementation with a static
//!   User-Agent and a per-request timeout
//! - [`RetryFetch`]: decorator that retries transient failures
//!
//! # Retry Strategy
//!
//! - Only [transient](DigError::is_transient) errors are retried
//! - Exponential backoff starting at 1 second, capped at 30 seconds
//! - Random jitter (0-250ms) added to each delay

use crate::error::DigError;
use crate::utils::truncate_for_log;
use rand::{Rng, rng};
use reqwest::Client;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// Trait for async page retrieval.
pub trait FetchPage {
    /// Fetch `url` and return the response body as text.
    async fn fetch(&self, url: &Url) -> Result<String, DigError>;
}

/// HTTP fetcher sending a fixed header set.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher around a fresh `reqwest` client.
    ///
    /// # Arguments
    ///
    /// * `user_agent` - Sent with every request
    /// * `timeout` - Whole-request timeout; a stalled server fails the dig
    ///   instead of blocking the cycle
    ///
    /// # Returns
    ///
    /// The fetcher, or [`DigError::Network`] if the client cannot be built.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, DigError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchPage for HttpFetcher {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, DigError> {
        let t0 = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DigError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = body.len(),
            body_preview = %truncate_for_log(&body, 200),
            "Fetched page"
        );
        Ok(body)
    }
}

/// Wrapper that adds exponential backoff retry logic to any [`FetchPage`].
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..250ms)
/// ```
pub struct RetryFetch<T> {
    inner: T,
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl<T: FetchPage> RetryFetch<T> {
    /// Wrap `inner` with retry logic.
    ///
    /// # Arguments
    ///
    /// * `inner` - The fetcher to retry
    /// * `max_retries` - Extra attempts after the first; 0 disables retrying
    /// * `base_delay` - Delay before the first retry, doubled on each attempt
    ///
    /// # Example
    ///
    /// ```ignore
    /// let fetcher = RetryFetch::new(HttpFetcher::new(UA, timeout)?, 2, Duration::from_secs(1));
    /// ```
    pub fn new(inner: T, max_retries: usize, base_delay: Duration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: Duration::from_secs(30),
        }
    }

    fn backoff(&self, attempt: usize) -> Duration {
        let shift = (attempt - 1).min(16) as u32;
        let delay = self
            .base_delay
            .saturating_mul(1u32 << shift)
            .min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=250);
        delay + Duration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T: FetchPage> FetchPage for RetryFetch<T> {
    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, DigError> {
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if !e.is_transient() => return Err(e),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(attempt, max = self.max_retries, error = %e, "fetch exhausted retries");
                        return Err(e);
                    }

                    let delay = self.backoff(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Fails with the given status a fixed number of times, then succeeds.
    struct Flaky {
        failures: usize,
        status: u16,
        calls: AtomicUsize,
    }

    impl FetchPage for Flaky {
        async fn fetch(&self, url: &Url) -> Result<String, DigError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(DigError::Status {
                    status: self.status,
                    url: url.to_string(),
                })
            } else {
                Ok("ok".to_string())
            }
        }
    }

    fn flaky(failures: usize, status: u16) -> Flaky {
        Flaky {
            failures,
            status,
            calls: AtomicUsize::new(0),
        }
    }

    fn test_url() -> Url {
        Url::parse("https://example.com/s?wd=x").unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_recovers_from_transient_errors() {
        let retry = RetryFetch::new(flaky(2, 503), 3, Duration::from_secs(1));
        let body = retry.fetch(&test_url()).await.unwrap();
        assert_eq!(body, "ok");
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_gives_up_after_max_retries() {
        let retry = RetryFetch::new(flaky(10, 500), 2, Duration::from_secs(1));
        let err = retry.fetch(&test_url()).await.unwrap_err();
        assert!(matches!(err, DigError::Status { status: 500, .. }));
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_skips_permanent_errors() {
        let retry = RetryFetch::new(flaky(10, 404), 5, Duration::from_secs(1));
        let err = retry.fetch(&test_url()).await.unwrap_err();
        assert!(matches!(err, DigError::Status { status: 404, .. }));
        assert_eq!(retry.inner.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_backoff_is_capped() {
        let retry = RetryFetch::new(flaky(0, 500), 40, Duration::from_secs(1));
        assert!(retry.backoff(1) >= Duration::from_secs(1));
        assert!(retry.backoff(1) <= Duration::from_millis(1250));
        assert!(retry.backoff(30) <= Duration::from_millis(30_250));
    }

    #[tokio::test]
    async fn test_http_fetcher_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/s"))
            .and(query_param("wd", "TestCo"))
            .and(header("user-agent", "digger-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>hi</html>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("digger-test/1.0", Duration::from_secs(5)).unwrap();
        let url = Url::parse(&format!("{}/s?wd=TestCo", server.uri())).unwrap();
        let body = fetcher.fetch(&url).await.unwrap();
        assert_eq!(body, "<html>hi</html>");
    }

    #[tokio::test]
    async fn test_http_fetcher_maps_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("digger-test/1.0", Duration::from_secs(5)).unwrap();
        let url = Url::parse(&format!("{}/s", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, DigError::Status { status: 403, .. }));
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_http_fetcher_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new("digger-test/1.0", Duration::from_millis(100)).unwrap();
        let url = Url::parse(&format!("{}/s", server.uri())).unwrap();
        let err = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(err, DigError::Network(_)));
    }
}
