//! Request-based verification strategies.
//!
//! ### Plain request
//! - HEAD first; when the status is not the expected one, retry with GET
//!   (some servers reject or mishandle HEAD).
//! - One timeout (default: 10s) bounds the whole HEAD/GET sequence.
//! - Redirects followed (max 10).
//!
//! ### Browser-identified request
//! - Same procedure, but with a desktop browser `User-Agent` and the
//!   `Accept`/`Accept-Language` headers a browser would send, for origins that
//!   reject clients without a recognizable browser signature.

use std::time::{Duration, Instant};

use reqwest::{Client, Method, StatusCode, header};

use linkvet_core::Error;
use linkvet_core::url::parse_http_url;

use crate::probe::{CheckResult, Probe};

/// Configuration for a request-based probe.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "linkvet/0.1")
    pub user_agent: String,

    /// Send browser-like `Accept` headers alongside the user agent.
    pub browser_headers: bool,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 10)
    pub max_redirects: usize,

    /// Status code that counts as success (default: 200)
    pub expected_status: u16,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "linkvet/0.1".to_string(),
            browser_headers: false,
            timeout: Duration::from_millis(10_000),
            max_redirects: 10,
            expected_status: 200,
        }
    }
}

impl FetchConfig {
    /// Config for the browser-identified strategy.
    pub fn browser_agent(user_agent: impl Into<String>) -> Self {
        Self { user_agent: user_agent.into(), browser_headers: true, ..Default::default() }
    }
}

/// HTTP probe implementing the plain and browser-identified strategies.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut headers = header::HeaderMap::new();
        if config.browser_headers {
            headers.insert(
                header::ACCEPT,
                header::HeaderValue::from_static(
                    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
                ),
            );
            headers.insert(header::ACCEPT_LANGUAGE, header::HeaderValue::from_static("en-US,en;q=0.9"));
        }

        let http = Client::builder()
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpError(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Issue a single request and return its status.
    async fn request(&self, method: Method, url: &str) -> Result<StatusCode, String> {
        let response = self
            .http
            .request(method, url)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { self.timeout_error(url) } else { e.to_string() })?;
        Ok(response.status())
    }

    fn timeout_error(&self, url: &str) -> String {
        Error::FetchTimeout(format!("{} after {}ms", url, self.config.timeout.as_millis())).to_string()
    }

    /// HEAD, then GET on any non-expected outcome, both within one timeout.
    pub async fn verify(&self, url: &str) -> CheckResult {
        if let Err(e) = parse_http_url(url) {
            return CheckResult::failure(url, None, Error::InvalidUrl(e.to_string()).to_string());
        }

        let start = Instant::now();
        match tokio::time::timeout(self.config.timeout, self.head_then_get(url, start)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::debug!(url, elapsed_ms = start.elapsed().as_millis() as u64, "check timed out");
                CheckResult::failure(url, None, self.timeout_error(url))
            }
        }
    }

    async fn head_then_get(&self, url: &str, start: Instant) -> CheckResult {
        let expected = self.config.expected_status;

        let head = self.request(Method::HEAD, url).await;
        if let Ok(status) = &head
            && status.as_u16() == expected
        {
            tracing::debug!(url, status = status.as_u16(), elapsed_ms = start.elapsed().as_millis() as u64, "HEAD ok");
            return CheckResult::success(url, status.as_u16());
        }

        let result = match self.request(Method::GET, url).await {
            Ok(status) => CheckResult::from_status(url, status.as_u16(), expected),
            Err(error) => CheckResult::failure(url, None, error),
        };

        tracing::debug!(
            url,
            head = ?head.as_ref().map(|s| s.as_u16()).ok(),
            status = ?result.status,
            ok = result.ok,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "GET fallback"
        );

        result
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

#[async_trait::async_trait]
impl Probe for FetchClient {
    async fn check(&self, url: &str) -> CheckResult {
        self.verify(url).await
    }
}
