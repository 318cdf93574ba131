//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::extract::Page;
use crate::state::PageStatus;
use crate::storage::{FailureRecord, PageRecord, RunRecord, RunStatus};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// This trait defines all database operations needed by the crawler and the
/// statistics report.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new crawl run and returns its ID
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status of a run and stamps its finish time
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Page Management =====

    /// Inserts or replaces the record for a crawled page
    ///
    /// # Returns
    ///
    /// The page ID
    fn upsert_page(&mut self, run_id: i64, page: &Page, status: PageStatus)
        -> StorageResult<i64>;

    /// Gets a page by URL
    fn get_page_by_url(&self, url: &str) -> StorageResult<Option<PageRecord>>;

    // ===== Link Management =====

    /// Inserts the outbound links of one page
    fn insert_links(&mut self, run_id: i64, from_url: &str, to_urls: &[String])
        -> StorageResult<()>;

    /// Gets all outgoing link targets of a page
    fn get_outgoing_links(&self, from_url: &str) -> StorageResult<Vec<String>>;

    /// Counts the total number of links
    fn count_links(&self) -> StorageResult<u64>;

    // ===== Failure Tracking =====

    /// Records a failed fetch
    fn record_failure(&mut self, run_id: i64, url: &str, kind: &str, message: &str)
        -> StorageResult<()>;

    /// Gets all failures of a run
    fn get_failures(&self, run_id: i64) -> StorageResult<Vec<FailureRecord>>;

    // ===== Statistics =====

    /// Counts pages by status
    fn count_pages_by_status(&self, status: PageStatus) -> StorageResult<u64>;

    /// Gets total page count
    fn count_total_pages(&self) -> StorageResult<u64>;

    /// Gets count of unique domains crawled
    fn count_unique_domains(&self) -> StorageResult<u64>;

    /// Gets failure counts by kind
    fn get_failure_summary(&self) -> StorageResult<HashMap<String, u64>>;

    /// Gets the most frequent keywords across all pages
    fn get_top_keywords(&self, limit: usize) -> StorageResult<Vec<(String, u64)>>;
}
