//! Statistics generation from the crawl database
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from the storage layer.

use crate::state::PageStatus;
use crate::storage::{RunRecord, Storage, StorageResult};
use std::collections::HashMap;

/// Number of keywords shown in the summary
const TOP_KEYWORDS: usize = 10;

/// Crawl statistics summary
#[derive(Debug, Clone)]
pub struct CrawlStatistics {
    /// Most recent run, if any
    pub latest_run: Option<RunRecord>,

    /// Total number of stored pages
    pub total_pages: u64,

    /// Count of pages by status
    pub pages_by_status: HashMap<PageStatus, u64>,

    /// Number of unique domains crawled
    pub unique_domains: u64,

    /// Total number of links recorded
    pub total_links: u64,

    /// Fetch failures by kind
    pub failure_summary: HashMap<String, u64>,

    /// Most frequent keywords across all pages
    pub top_keywords: Vec<(String, u64)>,
}

impl CrawlStatistics {
    /// Total fetch failures of any kind
    pub fn total_failures(&self) -> u64 {
        self.failure_summary.values().sum()
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<CrawlStatistics> {
    let mut pages_by_status = HashMap::new();
    for status in PageStatus::all_statuses() {
        let count = storage.count_pages_by_status(status)?;
        if count > 0 {
            pages_by_status.insert(status, count);
        }
    }

    Ok(CrawlStatistics {
        latest_run: storage.get_latest_run()?,
        total_pages: storage.count_total_pages()?,
        pages_by_status,
        unique_domains: storage.count_unique_domains()?,
        total_links: storage.count_links()?,
        failure_summary: storage.get_failure_summary()?,
        top_keywords: storage.get_top_keywords(TOP_KEYWORDS)?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    if let Some(run) = &stats.latest_run {
        println!("Latest run #{}:", run.id);
        println!("  Status: {}", run.status.to_db_string());
        println!("  Started: {}", run.started_at);
        if let Some(finished) = &run.finished_at {
            println!("  Finished: {}", finished);
        }
        println!();
    }

    println!("Overview:");
    println!("  Total pages: {}", stats.total_pages);
    println!("  Unique domains: {}", stats.unique_domains);
    println!("  Total links found: {}", stats.total_links);
    println!();

    println!("Pages by Status:");
    let mut status_counts: Vec<_> = stats.pages_by_status.iter().collect();
    status_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (status, count) in status_counts {
        let percentage = if stats.total_pages > 0 {
            (*count as f64 / stats.total_pages as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!();

    if !stats.failure_summary.is_empty() {
        println!("Failures ({}):", stats.total_failures());
        let mut failure_counts: Vec<_> = stats.failure_summary.iter().collect();
        failure_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

        for (kind, count) in failure_counts {
            println!("  {}: {}", kind, count);
        }
        println!();
    }

    if !stats.top_keywords.is_empty() {
        println!("Top Keywords:");
        for (keyword, count) in &stats.top_keywords {
            println!("  {}: {}", keyword, count);
        }
        println!();
    }
}
