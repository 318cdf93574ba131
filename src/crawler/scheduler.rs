//! Dispatch scheduling
//!
//! This module handles:
//! - Global concurrency limiting via a semaphore
//! - The optional page budget (`max-pages`)
//! - Handing the next admissible URL from the frontier to a fetch task

use crate::crawler::frontier::FrontierState;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// A URL handed to a fetch task, holding one concurrency slot
pub struct ScheduledFetch {
    /// The URL to fetch
    pub url: String,

    /// Released when the fetch task finishes
    pub _permit: OwnedSemaphorePermit,
}

/// Why no fetch could be scheduled right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Idle {
    /// Every concurrency slot is in use
    Saturated,
    /// The frontier has nothing waiting
    QueueEmpty,
    /// The page budget has been spent
    BudgetExhausted,
}

/// Scheduler bounds how many fetches run at once and how many are dispatched overall
pub struct Scheduler {
    /// Global semaphore for limiting concurrent fetches
    slots: Arc<Semaphore>,

    /// Maximum number of dispatches (0 = unlimited)
    max_pages: u64,

    /// Dispatches so far
    dispatched: u64,
}

impl Scheduler {
    /// Creates a scheduler with explicit limits
    pub fn with_limits(max_concurrent: usize, max_pages: u64) -> Self {
        Self {
            slots: Arc::new(Semaphore::new(max_concurrent.max(1))),
            max_pages,
            dispatched: 0,
        }
    }

    /// Takes the next admissible URL if a slot and budget are available
    ///
    /// Never waits: a saturated scheduler returns [`Idle::Saturated`] and the
    /// caller should wait for an in-flight fetch to finish.
    pub fn try_next(&mut self, frontier: &mut FrontierState) -> Result<ScheduledFetch, Idle> {
        if self.budget_exhausted() {
            return Err(Idle::BudgetExhausted);
        }

        let permit = self
            .slots
            .clone()
            .try_acquire_owned()
            .map_err(|_| Idle::Saturated)?;

        let url = frontier.next_admissible().ok_or(Idle::QueueEmpty)?;
        self.dispatched += 1;
        tracing::debug!("Dispatching {} ({} so far)", url, self.dispatched);

        Ok(ScheduledFetch {
            url,
            _permit: permit,
        })
    }

    /// Returns true once `max_pages` URLs have been dispatched
    pub fn budget_exhausted(&self) -> bool {
        self.max_pages > 0 && self.dispatched >= self.max_pages
    }

    /// Number of URLs dispatched so far
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }

    /// Number of free concurrency slots
    pub fn available_slots(&self) -> usize {
        self.slots.available_permits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frontier_with(urls: &[&str]) -> FrontierState {
        let mut frontier = FrontierState::new();
        for url in urls {
            frontier.seed(url);
        }
        frontier
    }

    #[test]
    fn test_dispatch_in_order() {
        let mut frontier = frontier_with(&["https://cc.gatech.edu/a", "https://cc.gatech.edu/b"]);
        let mut scheduler = Scheduler::with_limits(4, 0);

        let first = scheduler.try_next(&mut frontier).unwrap();
        let second = scheduler.try_next(&mut frontier).unwrap();
        assert_eq!(first.url, "https://cc.gatech.edu/a");
        assert_eq!(second.url, "https://cc.gatech.edu/b");
        assert!(frontier.is_dispatched("https://cc.gatech.edu/a"));
        assert_eq!(scheduler.dispatched(), 2);
        assert_eq!(
            scheduler.try_next(&mut frontier).err(),
            Some(Idle::QueueEmpty)
        );
    }

    #[test]
    fn test_concurrency_limit() {
        let mut frontier = frontier_with(&[
            "https://cc.gatech.edu/a",
            "https://cc.gatech.edu/b",
            "https://cc.gatech.edu/c",
        ]);
        let mut scheduler = Scheduler::with_limits(2, 0);

        let a = scheduler.try_next(&mut frontier).unwrap();
        let _b = scheduler.try_next(&mut frontier).unwrap();
        assert_eq!(scheduler.available_slots(), 0);
        assert_eq!(
            scheduler.try_next(&mut frontier).err(),
            Some(Idle::Saturated)
        );
        // A saturated scheduler must not consume queued URLs
        assert_eq!(frontier.queued_count(), 1);

        drop(a);
        let c = scheduler.try_next(&mut frontier).unwrap();
        assert_eq!(c.url, "https://cc.gatech.edu/c");
    }

    #[test]
    fn test_page_budget() {
        let mut frontier = frontier_with(&["https://cc.gatech.edu/a", "https://cc.gatech.edu/b"]);
        let mut scheduler = Scheduler::with_limits(4, 1);

        assert!(scheduler.try_next(&mut frontier).is_ok());
        assert!(scheduler.budget_exhausted());
        assert_eq!(
            scheduler.try_next(&mut frontier).err(),
            Some(Idle::BudgetExhausted)
        );
    }

    #[test]
    fn test_empty_queue_releases_slot() {
        let mut frontier = FrontierState::new();
        let mut scheduler = Scheduler::with_limits(1, 0);

        assert_eq!(
            scheduler.try_next(&mut frontier).err(),
            Some(Idle::QueueEmpty)
        );
        assert_eq!(scheduler.available_slots(), 1);
    }
}
