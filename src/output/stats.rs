//! Per-page crawl metrics
//!
//! After every crawled page the recorder derives one [`MetricsRow`] from the
//! page and a snapshot of the frontier, and hands it to a [`MetricsSink`].
//! Rows are never retained.

use crate::crawler::{FrontierSnapshot, FrontierState};
use crate::extract::Page;
use crate::output::traits::{MetricsSink, OutputResult};
use serde::Serialize;
use std::time::{Duration, Instant};

/// Column names of the metrics log, in order
pub const METRICS_COLUMNS: [&str; 14] = [
    "page_number",
    "elapsed_seconds",
    "elapsed_minutes",
    "total_urls_extracted",
    "total_keywords_extracted",
    "page_urls",
    "page_keywords",
    "urls_able_to_crawl",
    "urls_crawled",
    "urls_remaining",
    "encountered_urls_total",
    "encountered_urls_unique",
    "able_urls_unique",
    "crawled_urls_unique",
];

/// One row of crawl telemetry, emitted after each crawled page
///
/// Field order matches [`METRICS_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsRow {
    pub page_number: u64,
    pub elapsed_seconds: f64,
    pub elapsed_minutes: f64,
    pub total_urls_extracted: u64,
    pub total_keywords_extracted: u64,
    pub page_urls: u64,
    pub page_keywords: u64,
    pub urls_able_to_crawl: u64,
    pub urls_crawled: u64,
    pub urls_remaining: u64,
    pub encountered_urls_total: u64,
    pub encountered_urls_unique: u64,
    pub able_urls_unique: u64,
    pub crawled_urls_unique: u64,
}

/// Cumulative extraction totals across all recorded pages
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningTotals {
    pub urls_extracted: u64,
    pub keywords_extracted: u64,
}

impl RunningTotals {
    /// Adds one page's counts
    pub fn add(&mut self, page: &Page) {
        self.urls_extracted += page.out_links.len() as u64;
        self.keywords_extracted += page.keywords.len() as u64;
    }
}

impl MetricsRow {
    /// Derives a row from already-updated totals and frontier counts
    pub fn derive(
        page_number: u64,
        page: &Page,
        totals: &RunningTotals,
        snapshot: &FrontierSnapshot,
        elapsed: Duration,
    ) -> Self {
        let seconds = elapsed.as_secs_f64();

        Self {
            page_number,
            elapsed_seconds: round_to(seconds, 2),
            elapsed_minutes: round_to(seconds / 60.0, 4),
            total_urls_extracted: totals.urls_extracted,
            total_keywords_extracted: totals.keywords_extracted,
            page_urls: page.out_links.len() as u64,
            page_keywords: page.keywords.len() as u64,
            urls_able_to_crawl: snapshot.admissible as u64,
            urls_crawled: snapshot.crawled as u64,
            urls_remaining: snapshot.remaining as u64,
            encountered_urls_total: snapshot.encountered_total,
            encountered_urls_unique: snapshot.encountered_unique as u64,
            able_urls_unique: snapshot.able_unique as u64,
            crawled_urls_unique: snapshot.crawled as u64,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Derives and emits one metrics row per crawled page
pub struct MetricsRecorder {
    sink: Box<dyn MetricsSink>,
    started: Instant,
    pages: u64,
    totals: RunningTotals,
}

impl MetricsRecorder {
    /// Creates a recorder whose clock starts now
    pub fn new(sink: Box<dyn MetricsSink>) -> Self {
        Self::with_start(sink, Instant::now())
    }

    /// Creates a recorder measuring elapsed time from `started`
    pub fn with_start(sink: Box<dyn MetricsSink>, started: Instant) -> Self {
        Self {
            sink,
            started,
            pages: 0,
            totals: RunningTotals::default(),
        }
    }

    /// Records a page whose frontier updates have already been applied
    ///
    /// Page numbers start at 1 and increase by one per call.
    pub fn record(&mut self, page: &Page, frontier: &FrontierState) -> OutputResult<MetricsRow> {
        self.pages += 1;
        self.totals.add(page);

        let row = MetricsRow::derive(
            self.pages,
            page,
            &self.totals,
            &frontier.snapshot(),
            self.started.elapsed(),
        );

        self.sink.write_row(&row)?;
        Ok(row)
    }

    /// Number of rows recorded so far
    pub fn pages_recorded(&self) -> u64 {
        self.pages
    }

    /// Cumulative totals so far
    pub fn totals(&self) -> RunningTotals {
        self.totals
    }

    /// Flushes and closes the underlying sink
    pub fn finish(&mut self) -> OutputResult<()> {
        self.sink.finish()
    }
}
