//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Resolving request targets against the forum origin
//! - Bounding the number of requests in flight
//! - Per-request timeouts
//! - Error classification

use crate::config::UserAgentConfig;
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::state::CancelFlag;
use crate::url::resolve_target;
use async_trait::async_trait;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;

/// A single GET request: a target URL plus ordered query parameters
///
/// The target may be absolute or relative to the transport's origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    target: String,
    query: Vec<(String, String)>,
}

impl FetchRequest {
    /// Creates a request without query parameters
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            query: Vec::new(),
        }
    }

    /// Appends a query parameter, keeping insertion order
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// The request target as given
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Query parameters in insertion order
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Value of the first query parameter called `name`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// A successfully fetched document
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// The request this document answers
    pub request: FetchRequest,

    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Response body, decoded to UTF-8
    pub body: Vec<u8>,
}

/// Why a fetch produced no document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, reset while reading, ...
    #[error("network error for {url}: {message}")]
    Network { url: String, message: String },

    /// The request did not complete within its timeout
    #[error("request timeout for {url}")]
    Timeout { url: String },

    /// The server answered with a non-2xx status
    #[error("HTTP {status_code} for {url}")]
    Status { url: String, status_code: u16 },

    /// The request could not be built or the response was malformed
    #[error("protocol error for {url}: {message}")]
    Protocol { url: String, message: String },

    /// The crawl was cancelled before the request was sent
    #[error("request to {url} not sent, crawl cancelled")]
    Cancelled { url: String },

    /// The concurrency limiter stopped handing out slots
    #[error("concurrency limiter closed")]
    LimiterClosed,
}

impl FetchError {
    /// Returns true for connection-level failures, timeouts included
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Timeout { .. })
    }

    /// Returns true if the request was never sent because of cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Result of a fetch operation
pub type FetchResult = Result<FetchedDocument, FetchError>;

/// Something that can perform a single GET
///
/// [`HttpTransport`] is the real implementation; tests plug in their own to
/// observe or script responses.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Performs the request, returning the body or a classified failure
    async fn get(&self, request: &FetchRequest) -> FetchResult;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Timeout applied to every request sent with this client
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use thread_tally::config::UserAgentConfig;
/// use thread_tally::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "thread-tally".to_string(),
///     crawler_version: "0.1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent as `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Sends requests over HTTP with reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,

    /// Origin relative targets are resolved against
    base_url: Url,
}

impl HttpTransport {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Transport for HttpTransport {
    /// # Error classification
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | Unresolvable or foreign-origin target | `Protocol` |
    /// | Timeout | `Timeout` |
    /// | Connection refused / reset | `Network` |
    /// | Status outside 2xx | `Status` |
    /// | Malformed request or response | `Protocol` |
    async fn get(&self, request: &FetchRequest) -> FetchResult {
        let url = resolve_target(&self.base_url, request.target()).map_err(|e| {
            FetchError::Protocol {
                url: request.target().to_string(),
                message: e.to_string(),
            }
        })?;
        let url_str = url.to_string();

        let response = self
            .client
            .get(url)
            .query(request.query())
            .send()
            .await
            .map_err(|e| classify_error(&url_str, e))?;

        let status = response.status();
        let final_url = response.url().to_string();

        if !status.is_success() {
            return Err(FetchError::Status {
                url: final_url,
                status_code: status.as_u16(),
            });
        }

        // Decoded with the charset from Content-Type, UTF-8 when none is declared
        let body = response
            .text()
            .await
            .map_err(|e| classify_error(&final_url, e))?;

        Ok(FetchedDocument {
            request: request.clone(),
            url: final_url,
            status_code: status.as_u16(),
            body: body.into_bytes(),
        })
    }
}

/// Maps a reqwest error onto the fetch error kinds
fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_builder() || e.is_decode() || e.is_redirect() {
        FetchError::Protocol {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

/// Sends requests through a transport under a shared concurrency limit
///
/// At most `limiter.limit()` calls to [`fetch`](Self::fetch) have a request
/// outstanding at any time, across every fetcher sharing the same limiter.
pub struct Fetcher<T> {
    transport: T,
    limiter: ConcurrencyLimiter,
    timeout: Duration,
    cancel: CancelFlag,
}

impl<T: Transport> Fetcher<T> {
    /// Creates a fetcher with its own cancel flag
    pub fn new(transport: T, limiter: ConcurrencyLimiter, timeout: Duration) -> Self {
        Self {
            transport,
            limiter,
            timeout,
            cancel: CancelFlag::new(),
        }
    }

    /// Uses `cancel` as the stop signal
    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    pub fn cancel_flag(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Fetches one document
    ///
    /// Waits for a free slot, then checks the cancel flag so that nothing is
    /// sent after cancellation. The slot is held until the transport returns
    /// or the timeout fires.
    pub async fn fetch(&self, request: &FetchRequest) -> FetchResult {
        let _slot = self
            .limiter
            .acquire()
            .await
            .map_err(|_| FetchError::LimiterClosed)?;

        if self.cancel.is_cancelled() {
            return Err(FetchError::Cancelled {
                url: request.target().to_string(),
            });
        }

        match tokio::time::timeout(self.timeout, self.transport.get(request)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: request.target().to_string(),
            }),
        }
    }
}
