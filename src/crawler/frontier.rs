//! Crawl frontier bookkeeping
//!
//! [`FrontierState`] tracks which URLs have been discovered, which were
//! judged crawlable, which were actually crawled, and which are waiting to be
//! fetched. Every collection only grows, so all counts are monotonically
//! non-decreasing over a crawl.

use crate::policy::{evaluate, FilterVerdict, Policy};
use std::collections::{HashSet, VecDeque};

/// Result of recording one outbound link occurrence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encounter {
    /// The filter decision for the link
    pub verdict: FilterVerdict,
    /// True if the URL had not been discovered before
    pub newly_discovered: bool,
    /// True if the URL was added to the dispatch queue
    pub queued: bool,
}

/// Point-in-time copy of every frontier count
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrontierSnapshot {
    /// |discovered|
    pub discovered: usize,
    /// |admissible|, seeds included
    pub admissible: usize,
    /// |crawled|
    pub crawled: usize,
    /// admissible minus crawled, clamped at zero
    pub remaining: usize,
    /// Raw outbound link occurrences
    pub encountered_total: u64,
    /// Distinct URLs seen as link targets
    pub encountered_unique: usize,
    /// Distinct link targets that passed the filter
    pub able_unique: usize,
    /// URLs waiting in the dispatch queue
    pub queued: usize,
}

/// The crawl frontier owned by a single crawl
#[derive(Debug, Default)]
pub struct FrontierState {
    discovered: HashSet<String>,
    crawled: HashSet<String>,
    admissible: HashSet<String>,
    link_discovered: HashSet<String>,
    link_admissible: HashSet<String>,
    dispatched: HashSet<String>,
    encountered_total: u64,
    queue: VecDeque<String>,
}

impl FrontierState {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a seed URL
    ///
    /// Seeds bypass the link filter: they are discovered, admissible and
    /// queued unconditionally. Seeding the same URL twice is a no-op.
    pub fn seed(&mut self, url: &str) {
        self.discovered.insert(url.to_string());
        if self.admissible.insert(url.to_string()) {
            self.enqueue(url);
        }
    }

    /// Records a URL as discovered; returns true if it was new
    pub fn record_discovered(&mut self, url: &str) -> bool {
        self.discovered.insert(url.to_string())
    }

    /// Records a URL as crawled
    ///
    /// A URL that was never discovered is logged and added to the discovered
    /// set as well, so crawled stays a subset of discovered.
    pub fn record_crawled(&mut self, url: &str) {
        if !self.discovered.contains(url) {
            tracing::warn!("Crawled URL was never discovered: {}", url);
            self.discovered.insert(url.to_string());
        }
        self.dispatched.insert(url.to_string());
        self.crawled.insert(url.to_string());
    }

    /// Records one outbound link occurrence
    ///
    /// Every call counts toward the raw encounter total. The URL joins the
    /// discovered set regardless of the filter verdict; it joins the
    /// admissible set and the dispatch queue only when allowed.
    pub fn record_encounter(&mut self, url: &str, policy: &Policy) -> Encounter {
        self.encountered_total += 1;
        self.link_discovered.insert(url.to_string());
        let newly_discovered = self.discovered.insert(url.to_string());

        let verdict = evaluate(url, policy);
        let mut queued = false;

        if verdict.is_allowed() {
            self.link_admissible.insert(url.to_string());
            if self.admissible.insert(url.to_string())
                && !self.dispatched.contains(url)
                && !self.crawled.contains(url)
            {
                self.enqueue(url);
                queued = true;
            }
        } else {
            tracing::debug!("Filtered {}: {:?}", url, verdict);
        }

        Encounter {
            verdict,
            newly_discovered,
            queued,
        }
    }

    /// Pops the next admissible URL to fetch, in FIFO order
    ///
    /// URLs that were dispatched or crawled since they were queued are
    /// skipped. The returned URL is marked dispatched.
    pub fn next_admissible(&mut self) -> Option<String> {
        while let Some(url) = self.queue.pop_front() {
            if self.dispatched.contains(&url) || self.crawled.contains(&url) {
                continue;
            }
            self.dispatched.insert(url.clone());
            return Some(url);
        }
        None
    }

    /// Marks a URL as handed to the fetcher without popping it
    ///
    /// Used for redirect targets so the same content is not fetched twice.
    pub fn mark_dispatched(&mut self, url: &str) {
        self.dispatched.insert(url.to_string());
    }

    /// Returns true if the URL was already handed to the fetcher
    pub fn is_dispatched(&self, url: &str) -> bool {
        self.dispatched.contains(url)
    }

    /// Returns true if the URL has been crawled
    pub fn is_crawled(&self, url: &str) -> bool {
        self.crawled.contains(url)
    }

    /// Returns true if the URL has been discovered
    pub fn is_discovered(&self, url: &str) -> bool {
        self.discovered.contains(url)
    }

    /// Returns true if the URL passed the filter at least once (or is a seed)
    pub fn is_admissible(&self, url: &str) -> bool {
        self.admissible.contains(url)
    }

    /// Admissible URLs not yet crawled
    ///
    /// Crawled URLs outside the admissible set can push the difference below
    /// zero; that is logged and reported as zero.
    pub fn remaining_count(&self) -> usize {
        match self.admissible.len().checked_sub(self.crawled.len()) {
            Some(remaining) => remaining,
            None => {
                tracing::warn!(
                    "Crawled count {} exceeds admissible count {}",
                    self.crawled.len(),
                    self.admissible.len()
                );
                0
            }
        }
    }

    /// Number of URLs waiting in the dispatch queue
    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Captures all counts at once
    pub fn snapshot(&self) -> FrontierSnapshot {
        FrontierSnapshot {
            discovered: self.discovered.len(),
            admissible: self.admissible.len(),
            crawled: self.crawled.len(),
            remaining: self.remaining_count(),
            encountered_total: self.encountered_total,
            encountered_unique: self.link_discovered.len(),
            able_unique: self.link_admissible.len(),
            queued: self.queue.len(),
        }
    }

    fn enqueue(&mut self, url: &str) {
        tracing::debug!("Queued {}", url);
        self.queue.push_back(url.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_deny_extensions;

    fn policy() -> Policy {
        Policy::new(
            vec!["cc.gatech.edu".to_string()],
            vec![],
            default_deny_extensions(),
        )
    }

    fn assert_subset(frontier: &FrontierState) {
        for url in &frontier.crawled {
            assert!(frontier.discovered.contains(url), "{} not discovered", url);
        }
    }

    #[test]
    fn test_seed_is_admissible_and_queued() {
        let mut frontier = FrontierState::new();
        frontier.seed("https://cc.gatech.edu/");
        frontier.seed("https://cc.gatech.edu/");

        let snapshot = frontier.snapshot();
        assert_eq!(snapshot.discovered, 1);
        assert_eq!(snapshot.admissible, 1);
        assert_eq!(snapshot.queued, 1);
        assert_eq!(snapshot.encountered_unique, 0);
    }

    #[test]
    fn test_seed_bypasses_filter() {
        let mut frontier = FrontierState::new();
        frontier.seed("https://www.gatech.edu/");
        assert!(frontier.is_admissible("https://www.gatech.edu/"));
        assert_eq!(
            frontier.next_admissible().as_deref(),
            Some("https://www.gatech.edu/")
        );
    }

    #[test]
    fn test_record_discovered_idempotent() {
        let mut frontier = FrontierState::new();
        assert!(frontier.record_discovered("https://cc.gatech.edu/a"));
        assert!(!frontier.record_discovered("https://cc.gatech.edu/a"));
        assert_eq!(frontier.snapshot().discovered, 1);
    }

    #[test]
    fn test_encounter_accounting() {
        let policy = policy();
        let mut frontier = FrontierState::new();
        frontier.seed("https://cc.gatech.edu/");
        assert_eq!(frontier.next_admissible().as_deref(), Some("https://cc.gatech.edu/"));
        frontier.record_crawled("https://cc.gatech.edu/");

        let a = frontier.record_encounter("https://cc.gatech.edu/a", &policy);
        let b = frontier.record_encounter("https://cc.gatech.edu/b", &policy);
        let pdf = frontier.record_encounter("https://cc.gatech.edu/file.pdf", &policy);

        assert!(a.queued && b.queued);
        assert!(!pdf.queued);
        assert!(pdf.newly_discovered);

        let snapshot = frontier.snapshot();
        assert_eq!(snapshot.admissible, 3);
        assert_eq!(snapshot.crawled, 1);
        assert_eq!(snapshot.remaining, 2);
        assert_eq!(snapshot.encountered_total, 3);
        assert_eq!(snapshot.encountered_unique, 3);
        assert_eq!(snapshot.able_unique, 2);
        assert_eq!(snapshot.discovered, 4);
    }

    #[test]
    fn test_repeat_encounter_counts_raw_only() {
        let policy = policy();
        let mut frontier = FrontierState::new();

        let first = frontier.record_encounter("https://cc.gatech.edu/a", &policy);
        let second = frontier.record_encounter("https://cc.gatech.edu/a", &policy);

        assert!(first.queued);
        assert!(!second.queued);
        assert!(!second.newly_discovered);

        let snapshot = frontier.snapshot();
        assert_eq!(snapshot.encountered_total, 2);
        assert_eq!(snapshot.encountered_unique, 1);
        assert_eq!(snapshot.queued, 1);
    }

    #[test]
    fn test_link_to_seed_not_requeued() {
        let policy = policy();
        let mut frontier = FrontierState::new();
        frontier.seed("https://cc.gatech.edu/");
        frontier.next_admissible();

        let encounter = frontier.record_encounter("https://cc.gatech.edu/", &policy);
        assert!(!encounter.queued);
        assert_eq!(frontier.snapshot().able_unique, 1);
        assert_eq!(frontier.snapshot().admissible, 1);
    }

    #[test]
    fn test_next_admissible_fifo() {
        let policy = policy();
        let mut frontier = FrontierState::new();
        frontier.seed("https://cc.gatech.edu/");
        frontier.record_encounter("https://cc.gatech.edu/a", &policy);
        frontier.record_encounter("https://cc.gatech.edu/b", &policy);

        assert_eq!(frontier.next_admissible().as_deref(), Some("https://cc.gatech.edu/"));
        assert_eq!(frontier.next_admissible().as_deref(), Some("https://cc.gatech.edu/a"));
        assert_eq!(frontier.next_admissible().as_deref(), Some("https://cc.gatech.edu/b"));
        assert_eq!(frontier.next_admissible(), None);
    }

    #[test]
    fn test_next_admissible_skips_dispatched() {
        let policy = policy();
        let mut frontier = FrontierState::new();
        frontier.record_encounter("https://cc.gatech.edu/a", &policy);
        frontier.record_encounter("https://cc.gatech.edu/b", &policy);
        frontier.mark_dispatched("https://cc.gatech.edu/a");

        assert_eq!(frontier.next_admissible().as_deref(), Some("https://cc.gatech.edu/b"));
        assert_eq!(frontier.next_admissible(), None);
    }

    #[test]
    fn test_crawled_without_discovery_keeps_subset() {
        let mut frontier = FrontierState::new();
        frontier.record_crawled("https://cc.gatech.edu/redirected");

        assert!(frontier.is_discovered("https://cc.gatech.edu/redirected"));
        assert_subset(&frontier);
    }

    #[test]
    fn test_remaining_clamped_at_zero() {
        let mut frontier = FrontierState::new();
        frontier.record_crawled("https://cc.gatech.edu/a");
        frontier.record_crawled("https://cc.gatech.edu/b");

        assert_eq!(frontier.remaining_count(), 0);
        assert_eq!(frontier.snapshot().remaining, 0);
    }

    #[test]
    fn test_counts_monotonic() {
        let policy = policy();
        let mut frontier = FrontierState::new();
        frontier.seed("https://cc.gatech.edu/");

        let links = [
            "https://cc.gatech.edu/a",
            "https://www.gatech.edu/",
            "https://cc.gatech.edu/a",
            "mailto:someone@cc.gatech.edu",
            "https://cc.gatech.edu/b.zip",
            "https://cc.gatech.edu/c",
        ];

        let mut previous = frontier.snapshot();
        for (i, link) in links.iter().enumerate() {
            frontier.record_encounter(link, &policy);
            if i % 2 == 0 {
                if let Some(url) = frontier.next_admissible() {
                    frontier.record_crawled(&url);
                }
            }

            let current = frontier.snapshot();
            assert!(current.discovered >= previous.discovered);
            assert!(current.admissible >= previous.admissible);
            assert!(current.crawled >= previous.crawled);
            assert!(current.encountered_total > previous.encountered_total);
            assert!(current.encountered_unique >= previous.encountered_unique);
            assert!(current.able_unique >= previous.able_unique);
            assert_subset(&frontier);
            previous = current;
        }
    }
}
