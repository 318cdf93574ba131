//! Crawler module for page fetching and crawl coordination
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with retry logic and robots.txt checks
//! - Frontier bookkeeping (discovered, admissible and crawled sets)
//! - Concurrency limiting and the page budget
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
pub mod frontier;
mod scheduler;

pub use coordinator::{Coordinator, CrawlReport, CrawlSettings};
pub use fetcher::{
    build_http_client, user_agent_string, FetchError, FetchedDocument, Fetcher, HttpFetcher,
};
pub use frontier::{Encounter, FrontierSnapshot, FrontierState};
pub use scheduler::{Idle, ScheduledFetch, Scheduler};

use crate::config::Config;
use crate::output::open_sinks;
use crate::Result;
use tokio_util::sync::CancellationToken;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP fetcher
/// 2. Seed the frontier from the configuration
/// 3. Open the page, metrics and database outputs
/// 4. Fetch pages and follow admissible links until the frontier is
///    exhausted, the page budget is spent, or `cancel` fires
pub async fn run_crawl(
    config: &Config,
    config_hash: &str,
    cancel: CancellationToken,
) -> Result<CrawlReport> {
    let fetcher = HttpFetcher::new(&config.crawler, &config.user_agent)?;
    let coordinator = Coordinator::from_config(config, fetcher)?.with_cancellation(cancel);

    coordinator
        .run(|| open_sinks(&config.output, config_hash))
        .await
}
