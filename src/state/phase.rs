//! Crawl lifecycle
//!
//! ```text
//! Idle -> Running -> Draining -> Stopped
//!   |        |
//!   +--------+----> Failed ----> Stopped
//! ```

use crate::CanopyError;
use std::fmt;

/// Lifecycle phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Seeds are being recorded; nothing has been fetched
    Idle,

    /// Fetches are being dispatched
    Running,

    /// No new fetches; in-flight work is completing
    Draining,

    /// An output sink failed; work is being abandoned
    Failed,

    /// Terminal; the crawl cannot be resumed
    Stopped,
}

impl CrawlPhase {
    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Idle, Running)
                | (Idle, Failed)
                | (Running, Draining)
                | (Running, Failed)
                | (Draining, Stopped)
                | (Draining, Failed)
                | (Failed, Stopped)
        )
    }

    /// Validates and returns the next phase
    pub fn transition(self, next: CrawlPhase) -> Result<CrawlPhase, CanopyError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(CanopyError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    /// Returns true for the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped)
    }

    /// Returns true while new fetches may be dispatched
    pub fn accepts_work(&self) -> bool {
        matches!(self, Self::Running)
    }

    /// Lowercase name used in logs and the run table
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
