//! SQLite-backed page sink
//!
//! Mirrors every crawled page, its outbound links and every fetch failure
//! into the storage backend under a single run.

use crate::crawler::FetchError;
use crate::extract::Page;
use crate::output::traits::{OutputResult, PageSink};
use crate::state::PageStatus;
use crate::storage::{RunStatus, Storage};

/// Page sink writing to a [`Storage`] backend
pub struct SqlitePageSink {
    storage: Box<dyn Storage + Send>,
    run_id: i64,
}

impl SqlitePageSink {
    /// Starts a new run in `storage` and returns a sink recording into it
    pub fn start(mut storage: Box<dyn Storage + Send>, config_hash: &str) -> OutputResult<Self> {
        let run_id = storage.create_run(config_hash)?;
        tracing::info!("Recording crawl as run {}", run_id);
        Ok(Self { storage, run_id })
    }

    /// The run this sink records into
    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    /// Read access to the underlying storage
    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }
}

impl PageSink for SqlitePageSink {
    fn record_page(&mut self, page: &Page) -> OutputResult<()> {
        let status = if page.is_contentless() {
            PageStatus::Contentless
        } else {
            PageStatus::Crawled
        };

        self.storage.upsert_page(self.run_id, page, status)?;
        self.storage
            .insert_links(self.run_id, &page.url, &page.out_links)?;
        Ok(())
    }

    fn record_failure(&mut self, url: &str, error: &FetchError) -> OutputResult<()> {
        self.storage
            .record_failure(self.run_id, url, error.kind(), &error.to_string())?;
        Ok(())
    }

    fn finish(&mut self, status: RunStatus) -> OutputResult<()> {
        self.storage.finish_run(self.run_id, status)?;
        Ok(())
    }
}
