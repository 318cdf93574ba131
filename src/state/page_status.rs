/// Page status definitions for crawl records
///
/// Every URL handed to the fetcher ends up with exactly one of these.
use std::fmt;

/// Outcome of processing a single dispatched URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageStatus {
    /// Page was fetched and content was extracted
    Crawled,

    /// Page was fetched but nothing could be extracted (not HTML, bad encoding, empty)
    Contentless,

    /// Fetch failed; the URL was never marked crawled
    Failed,
}

impl PageStatus {
    /// Returns true if the URL counts as crawled
    pub fn is_crawled(&self) -> bool {
        matches!(self, Self::Crawled | Self::Contentless)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Crawled => "crawled",
            Self::Contentless => "contentless",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "crawled" => Some(Self::Crawled),
            "contentless" => Some(Self::Contentless),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![Self::Crawled, Self::Contentless, Self::Failed]
    }
}

impl fmt::Display for PageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
