//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: Lifecycle of a single crawl (idle, running, draining, failed, stopped)
//! - `PageStatus`: Outcome recorded for each page that reached the fetcher

mod page_status;
mod phase;

// Re-export main types
pub use page_status::PageStatus;
pub use phase::CrawlPhase;
