//! Crawler coordinator - main crawl orchestration logic
//!
//! The coordinator owns the crawl: it seeds the frontier, dispatches fetches
//! up to the concurrency limit, and drives the [`CrawlPhase`] state machine.
//! Each fetch task fetches and extracts its page, then records the result
//! under the shared lock: frontier update, metrics row and page sinks happen
//! together, so every row reflects one consistent frontier snapshot.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::frontier::{FrontierSnapshot, FrontierState};
use crate::crawler::scheduler::{Idle, ScheduledFetch, Scheduler};
use crate::extract::{extract_page, Page};
use crate::output::{CrawlSinks, MetricsRecorder, OutputError, PageSink};
use crate::policy::Policy;
use crate::state::CrawlPhase;
use crate::storage::RunStatus;
use crate::url::{canonicalize_url, frontier_key};
use crate::{CanopyError, ConfigError, Result};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Crawl parameters the coordinator needs from the configuration
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    /// Canonical seed URLs
    pub seeds: Vec<String>,
    pub keyword_limit: usize,
    pub max_concurrent_fetches: usize,
    /// 0 = unlimited
    pub max_pages: u64,
}

impl CrawlSettings {
    /// Extracts and canonicalizes the crawl parameters
    pub fn from_config(config: &CrawlerConfig) -> std::result::Result<Self, ConfigError> {
        if config.seeds.is_empty() {
            return Err(ConfigError::Validation(
                "At least one seed URL is required".to_string(),
            ));
        }

        let seeds = config
            .seeds
            .iter()
            .map(|seed| {
                canonicalize_url(seed)
                    .map(String::from)
                    .map_err(|e| ConfigError::InvalidUrl(format!("Seed '{}': {}", seed, e)))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            seeds,
            keyword_limit: config.keyword_limit,
            max_concurrent_fetches: config.max_concurrent_fetches as usize,
            max_pages: config.max_pages,
        })
    }
}

/// Summary of a finished crawl
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Pages recorded (one metrics row each)
    pub pages_crawled: u64,
    /// Dispatched URLs whose fetch failed
    pub fetch_failures: u64,
    /// Frontier counts at the end of the crawl
    pub frontier: FrontierSnapshot,
    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
    /// How the run ended
    pub status: RunStatus,
    /// Always `Stopped` for a returned report
    pub phase: CrawlPhase,
}

/// State shared between the dispatch loop and fetch tasks
struct CrawlShared {
    frontier: FrontierState,
    metrics: MetricsRecorder,
    pages: Box<dyn PageSink>,
    pages_crawled: u64,
    fetch_failures: u64,
}

/// A fetched and extracted page, ready to be recorded
struct FetchedPage {
    page: Page,
}

impl CrawlShared {
    /// Applies one finished fetch to the frontier and sinks
    fn record(
        &mut self,
        dispatched: &str,
        result: std::result::Result<FetchedPage, FetchError>,
        policy: &Policy,
    ) -> std::result::Result<(), OutputError> {
        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("Failed to fetch {}: {}", dispatched, e);
                self.fetch_failures += 1;
                return self.pages.record_failure(dispatched, &e);
            }
        };

        let page = fetched.page;
        let already_recorded = self.frontier.is_crawled(&page.url);

        self.frontier.record_crawled(dispatched);
        if page.url != dispatched {
            tracing::debug!("{} redirected to {}", dispatched, page.url);
            self.frontier.record_discovered(&page.url);
            self.frontier.record_crawled(&page.url);
        }

        if already_recorded {
            tracing::debug!("Skipping {}: already recorded", page.url);
            return Ok(());
        }

        for link in &page.out_links {
            self.frontier.record_encounter(&frontier_key(link), policy);
        }

        // Page first, so a metrics row never describes an unrecorded page
        self.pages.record_page(&page)?;
        let row = self.metrics.record(&page, &self.frontier)?;
        self.pages_crawled += 1;

        if page.is_contentless() {
            tracing::warn!("No content extracted from {}", page.url);
        }
        tracing::info!(
            "[{}] Crawled {} ({} links, {} keywords, {} remaining)",
            row.page_number,
            page.url,
            row.page_urls,
            row.page_keywords,
            row.urls_remaining
        );

        Ok(())
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F: Fetcher> {
    fetcher: Arc<F>,
    policy: Arc<Policy>,
    settings: CrawlSettings,
    phase: Mutex<CrawlPhase>,
    cancel: CancellationToken,
}

impl<F: Fetcher> Coordinator<F> {
    /// Creates a coordinator in the `Idle` phase
    pub fn new(fetcher: F, policy: Policy, settings: CrawlSettings) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            policy: Arc::new(policy),
            settings,
            phase: Mutex::new(CrawlPhase::Idle),
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a coordinator from a validated configuration
    pub fn from_config(config: &Config, fetcher: F) -> Result<Self> {
        let policy = Policy::from_config(&config.policy)?;
        let settings = CrawlSettings::from_config(&config.crawler)?;
        Ok(Self::new(fetcher, policy, settings))
    }

    /// Uses an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops dispatch when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The current lifecycle phase
    pub fn phase(&self) -> CrawlPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn advance(&self, next: CrawlPhase) -> Result<()> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = *phase;
        *phase = previous.transition(next)?;
        tracing::info!("Crawl phase: {} -> {}", previous, next);
        Ok(())
    }

    /// Runs the crawl to completion
    ///
    /// `open_sinks` is called once, before any fetch. If it fails the crawl
    /// moves to `Failed` and then `Stopped` without processing a page. A
    /// coordinator runs at most once.
    pub async fn run<O>(&self, open_sinks: O) -> Result<CrawlReport>
    where
        O: FnOnce() -> std::result::Result<CrawlSinks, OutputError>,
    {
        let current = self.phase();
        if current != CrawlPhase::Idle {
            return Err(CanopyError::InvalidTransition {
                from: current,
                to: CrawlPhase::Running,
            });
        }

        let started = Instant::now();
        let sinks = match open_sinks() {
            Ok(sinks) => sinks,
            Err(e) => {
                tracing::error!("Failed to open outputs: {}", e);
                self.advance(CrawlPhase::Failed)?;
                self.advance(CrawlPhase::Stopped)?;
                return Err(e.into());
            }
        };

        let mut frontier = FrontierState::new();
        for seed in &self.settings.seeds {
            frontier.seed(seed);
        }
        tracing::info!("Seeded frontier with {} URLs", self.settings.seeds.len());

        let shared = Arc::new(Mutex::new(CrawlShared {
            frontier,
            metrics: MetricsRecorder::with_start(sinks.metrics, started),
            pages: sinks.pages,
            pages_crawled: 0,
            fetch_failures: 0,
        }));

        self.advance(CrawlPhase::Running)?;

        let mut scheduler = Scheduler::with_limits(
            self.settings.max_concurrent_fetches,
            self.settings.max_pages,
        );
        let mut tasks: JoinSet<std::result::Result<(), OutputError>> = JoinSet::new();
        let mut interrupted = false;
        let mut failure: Option<CanopyError> = None;

        loop {
            if self.phase().accepts_work() {
                if self.cancel.is_cancelled() {
                    tracing::info!("Crawl cancelled; waiting for {} in-flight fetches", tasks.len());
                    interrupted = true;
                    self.advance(CrawlPhase::Draining)?;
                } else {
                    self.dispatch(&mut scheduler, &shared, &mut tasks)?;
                }
            }

            if tasks.is_empty() {
                break;
            }

            let joined = tokio::select! {
                biased;
                _ = self.cancel.cancelled(), if self.phase().accepts_work() => continue,
                joined = tasks.join_next() => joined,
            };

            match joined {
                Some(Ok(Ok(()))) => {}
                Some(Ok(Err(e))) => {
                    tracing::error!("Output failed, abandoning crawl: {}", e);
                    failure = Some(e.into());
                    break;
                }
                Some(Err(e)) => {
                    tracing::error!("Fetch task failed: {}", e);
                }
                None => break,
            }
        }

        if let Some(error) = failure {
            self.advance(CrawlPhase::Failed)?;
            tasks.abort_all();
            while tasks.join_next().await.is_some() {}

            let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(e) = guard.pages.finish(RunStatus::Failed) {
                tracing::warn!("Failed to close page outputs: {}", e);
            }
            if let Err(e) = guard.metrics.finish() {
                tracing::warn!("Failed to close metrics log: {}", e);
            }
            drop(guard);

            self.advance(CrawlPhase::Stopped)?;
            return Err(error);
        }

        let status = if interrupted {
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };

        let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
        let metrics_closed = guard.metrics.finish();
        let pages_closed = guard.pages.finish(status);
        let finished = metrics_closed.and(pages_closed);

        if let Err(e) = finished {
            drop(guard);
            tracing::error!("Failed to close outputs: {}", e);
            self.advance(CrawlPhase::Failed)?;
            self.advance(CrawlPhase::Stopped)?;
            return Err(e.into());
        }

        let report = CrawlReport {
            pages_crawled: guard.pages_crawled,
            fetch_failures: guard.fetch_failures,
            frontier: guard.frontier.snapshot(),
            elapsed: started.elapsed(),
            status,
            phase: CrawlPhase::Stopped,
        };
        drop(guard);

        self.advance(CrawlPhase::Stopped)?;
        tracing::info!(
            "Crawl {}: {} pages crawled, {} failures in {:.1?}",
            status.to_db_string(),
            report.pages_crawled,
            report.fetch_failures,
            report.elapsed
        );

        Ok(report)
    }

    /// Spawns fetch tasks until the scheduler runs out of slots or work
    fn dispatch(
        &self,
        scheduler: &mut Scheduler,
        shared: &Arc<Mutex<CrawlShared>>,
        tasks: &mut JoinSet<std::result::Result<(), OutputError>>,
    ) -> Result<()> {
        loop {
            let next = {
                let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
                scheduler.try_next(&mut guard.frontier)
            };

            match next {
                Ok(scheduled) => self.spawn_fetch(scheduled, shared, tasks),
                Err(Idle::Saturated) => return Ok(()),
                Err(Idle::QueueEmpty) => {
                    if tasks.is_empty() {
                        tracing::info!("Frontier exhausted");
                        self.advance(CrawlPhase::Draining)?;
                    }
                    return Ok(());
                }
                Err(Idle::BudgetExhausted) => {
                    tracing::info!(
                        "Page budget of {} reached; draining",
                        self.settings.max_pages
                    );
                    self.advance(CrawlPhase::Draining)?;
                    return Ok(());
                }
            }
        }
    }

    fn spawn_fetch(
        &self,
        scheduled: ScheduledFetch,
        shared: &Arc<Mutex<CrawlShared>>,
        tasks: &mut JoinSet<std::result::Result<(), OutputError>>,
    ) {
        let ScheduledFetch {
            url,
            _permit: permit,
        } = scheduled;
        let fetcher = Arc::clone(&self.fetcher);
        let policy = Arc::clone(&self.policy);
        let shared = Arc::clone(shared);
        let keyword_limit = self.settings.keyword_limit;

        tasks.spawn(async move {
            let result = fetch_and_extract(fetcher.as_ref(), &url, keyword_limit).await;
            drop(permit);

            let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
            guard.record(&url, result, &policy)
        });
    }
}

/// Fetches one URL and extracts its content
///
/// Extraction runs synchronously after the fetch completes; the parsed
/// document never lives across an await point.
async fn fetch_and_extract<F: Fetcher>(
    fetcher: &F,
    url: &str,
    keyword_limit: usize,
) -> std::result::Result<FetchedPage, FetchError> {
    let parsed = Url::parse(url).map_err(|e| FetchError::Network {
        url: url.to_string(),
        message: e.to_string(),
    })?;

    let document = fetcher.fetch(&parsed).await?;

    let mut final_url = document.final_url;
    final_url.set_fragment(None);

    let page = extract_page(
        &document.body,
        document.content_type.as_deref(),
        &final_url,
        keyword_limit,
    );

    Ok(FetchedPage { page })
}
