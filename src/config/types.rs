use serde::Deserialize;

/// Main configuration structure for a crawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    pub policy: PolicyConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Entry points of the crawl; these bypass the link filter
    pub seeds: Vec<String>,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-fetches", default = "default_concurrency")]
    pub max_concurrent_fetches: u32,

    /// Number of keywords kept per page
    #[serde(rename = "keyword-limit", default = "default_keyword_limit")]
    pub keyword_limit: usize,

    /// Stop dispatching after this many pages (0 = unlimited)
    #[serde(rename = "max-pages", default)]
    pub max_pages: u64,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Retries the fetcher performs on transient failures
    #[serde(rename = "max-retries", default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay between fetch retries (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Whether the fetcher honours robots.txt
    #[serde(rename = "respect-robots", default = "default_true")]
    pub respect_robots: bool,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON-lines page output
    #[serde(rename = "pages-path")]
    pub pages_path: String,

    /// Path of the CSV metrics log
    #[serde(rename = "metrics-path")]
    pub metrics_path: String,

    /// Optional SQLite database mirroring pages, links and failures
    #[serde(rename = "database-path", default)]
    pub database_path: Option<String>,
}

/// Link filter configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PolicyConfig {
    /// Hostname suffixes the crawl is confined to
    #[serde(rename = "allowed-domains")]
    pub allowed_domains: Vec<String>,

    /// Regular expressions matched against the full URL
    #[serde(rename = "deny-patterns", default)]
    pub deny_patterns: Vec<String>,

    /// Plain substrings matched against the full URL
    #[serde(rename = "deny-substrings", default)]
    pub deny_substrings: Vec<String>,

    /// File extensions (without the dot) that are never followed
    #[serde(rename = "deny-extensions", default = "default_deny_extensions")]
    pub deny_extensions: Vec<String>,
}

fn default_concurrency() -> u32 {
    16
}

fn default_keyword_limit() -> usize {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

/// Extensions of binary payloads that would only pollute keyword statistics
pub fn default_deny_extensions() -> Vec<String> {
    [
        "pdf", "doc", "docx", "ppt", "pptx", "xls", "xlsx", "zip", "rar", "7z", "jpg", "jpeg",
        "png", "gif", "svg", "webp", "mp3", "mp4", "mov", "avi", "exe", "ps", "gz", "eps", "tar",
        "tgz", "mid", "class", "mpg", "mpeg", "z",
    ]
    .iter()
    .map(|ext| ext.to_string())
    .collect()
}
