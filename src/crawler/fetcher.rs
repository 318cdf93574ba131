//! HTTP fetching
//!
//! The coordinator depends only on the [`Fetcher`] trait. [`HttpFetcher`] is
//! the production implementation over `reqwest`, handling:
//! - Building HTTP clients with proper user agent strings
//! - Retry logic for transient failures
//! - Redirects (up to 10 hops)
//! - robots.txt checks with a per-origin cache
//! - Error classification

use crate::config::{CrawlerConfig, UserAgentConfig};
use crate::robots::{self, ParsedRobots, RobotsCache};
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex as AsyncMutex;
use url::Url;

/// Maximum redirect hops followed per request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched response body
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// URL the body was served from, after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: u16,
    /// Content-Type header value, if present
    pub content_type: Option<String>,
    /// Raw response body
    pub body: Vec<u8>,
}

/// Reasons a fetch produced no document
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("{url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("{url} is disallowed by robots.txt")]
    RobotsDenied { url: String },
}

impl FetchError {
    /// Short machine-readable classification
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::HttpStatus { .. } => "http_status",
            Self::Network { .. } => "network",
            Self::RobotsDenied { .. } => "robots_denied",
        }
    }

    /// Returns true if repeating the request may succeed
    ///
    /// Timeouts, network errors and 5xx responses are transient; 4xx
    /// responses and robots.txt denials are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. } | Self::Network { .. } => true,
            Self::HttpStatus { status, .. } => *status >= 500,
            Self::RobotsDenied { .. } => false,
        }
    }

    /// The URL that failed
    pub fn url(&self) -> &str {
        match self {
            Self::Timeout { url }
            | Self::HttpStatus { url, .. }
            | Self::Network { url, .. }
            | Self::RobotsDenied { url } => url,
        }
    }
}

/// Source of documents for the crawl
pub trait Fetcher: Send + Sync + 'static {
    /// Fetches a URL, following redirects
    fn fetch(&self, url: &Url) -> impl Future<Output = Result<FetchedDocument, FetchError>> + Send;
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds an HTTP client with proper configuration
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    let timeout = Duration::from_secs(crawler.request_timeout_secs);

    Client::builder()
        .user_agent(user_agent_string(user_agent))
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetcher over `reqwest`
pub struct HttpFetcher {
    client: Client,
    robots_agent: String,
    respect_robots: bool,
    max_retries: u32,
    retry_delay: Duration,
    robots: Mutex<RobotsCache>,
    robots_fetch: AsyncMutex<()>,
}

impl HttpFetcher {
    /// Creates a fetcher from the crawler and user agent configuration
    pub fn new(crawler: &CrawlerConfig, user_agent: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(user_agent, crawler)?,
            robots_agent: user_agent.crawler_name.clone(),
            respect_robots: crawler.respect_robots,
            max_retries: crawler.max_retries,
            retry_delay: Duration::from_millis(crawler.retry_delay_ms),
            robots: Mutex::new(RobotsCache::new()),
            robots_fetch: AsyncMutex::new(()),
        })
    }

    fn cached_robots(&self, origin: &str) -> Option<ParsedRobots> {
        match self.robots.lock() {
            Ok(cache) => cache.get_fresh(origin),
            Err(_) => None,
        }
    }

    /// Checks robots.txt for the URL's origin, fetching it on first use
    ///
    /// Cache misses are serialized, so concurrent fetches against a cold
    /// origin request robots.txt once and share the result.
    async fn robots_allows(&self, url: &Url) -> bool {
        let origin = robots::origin_key(url);

        let rules = match self.cached_robots(&origin) {
            Some(rules) => rules,
            None => {
                let _fetching = self.robots_fetch.lock().await;
                match self.cached_robots(&origin) {
                    Some(rules) => rules,
                    None => {
                        let rules = robots::fetch_robots(&self.client, url).await;
                        if let Ok(mut cache) = self.robots.lock() {
                            cache.insert(origin, rules.clone());
                        }
                        rules
                    }
                }
            }
        };

        robots::is_allowed(&rules, url.as_str(), &self.robots_agent)
    }

    /// Performs a single GET without retries
    async fn fetch_once(&self, url: &Url) -> Result<FetchedDocument, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .bytes()
            .await
            .map_err(|e| classify_error(url, e))?;

        Ok(FetchedDocument {
            final_url,
            status: status.as_u16(),
            content_type,
            body: body.to_vec(),
        })
    }
}

impl Fetcher for HttpFetcher {
    /// Fetches a URL with robots.txt and retry handling
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 4xx | Fail immediately |
    /// | HTTP 5xx | Retry up to `max-retries` times |
    /// | Timeout | Retry up to `max-retries` times |
    /// | Connection error | Retry up to `max-retries` times |
    /// | Too many redirects | Retry up to `max-retries` times |
    async fn fetch(&self, url: &Url) -> Result<FetchedDocument, FetchError> {
        if self.respect_robots && !self.robots_allows(url).await {
            return Err(FetchError::RobotsDenied {
                url: url.to_string(),
            });
        }

        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Ok(document) => return Ok(document),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} ({}/{}): {}",
                        url,
                        attempt,
                        self.max_retries,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Maps a reqwest error onto the fetch error taxonomy
fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if let Some(status) = error.status() {
        FetchError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
