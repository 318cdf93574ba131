//! Output module for crawl records, metrics and summaries
//!
//! This module handles:
//! - Writing one JSON record per crawled page
//! - Recording per-page crawl metrics to CSV
//! - Mirroring pages, links and failures into SQLite
//! - Printing statistics from a previous crawl

mod csv_metrics;
mod jsonl;
mod sqlite_output;
pub mod stats;
mod summary;
mod traits;

pub use csv_metrics::CsvMetricsSink;
pub use jsonl::JsonLinesPageSink;
pub use sqlite_output::SqlitePageSink;
pub use stats::{MetricsRecorder, MetricsRow, RunningTotals, METRICS_COLUMNS};
pub use summary::{load_statistics, print_statistics, CrawlStatistics};
pub use traits::{MetricsSink, MultiPageSink, OutputError, OutputResult, PageSink};

use crate::config::OutputConfig;
use crate::storage::open_storage;
use std::path::Path;

/// The sinks a crawl writes to
pub struct CrawlSinks {
    pub pages: Box<dyn PageSink>,
    pub metrics: Box<dyn MetricsSink>,
}

/// Opens every configured output
///
/// The page record file and the metrics log are always created (truncating
/// existing files). The SQLite mirror is opened only when a database path is
/// configured, and starts a new run stamped with `config_hash`.
pub fn open_sinks(config: &OutputConfig, config_hash: &str) -> OutputResult<CrawlSinks> {
    let mut pages = MultiPageSink::new();
    pages.push(Box::new(JsonLinesPageSink::create(Path::new(
        &config.pages_path,
    ))?));

    if let Some(database_path) = &config.database_path {
        let storage = open_storage(Path::new(database_path))?;
        pages.push(Box::new(SqlitePageSink::start(
            Box::new(storage),
            config_hash,
        )?));
    }

    let metrics = CsvMetricsSink::create(Path::new(&config.metrics_path))?;
    tracing::info!(
        "Writing pages to {} and metrics to {}",
        config.pages_path,
        config.metrics_path
    );

    Ok(CrawlSinks {
        pages: Box::new(pages),
        metrics: Box::new(metrics),
    })
}
