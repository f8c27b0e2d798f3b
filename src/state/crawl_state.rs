use crate::output::CrawlStats;
use crate::state::CrawlPhase;
use chrono::Utc;
use std::fmt;
use std::time::Instant;

/// Why a crawl stopped issuing requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopReason {
    /// A listing page came back without discussion links
    Exhausted,

    /// The configured maximum number of listing pages was reached
    PageLimit,

    /// The cancel flag was set
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Exhausted => "exhausted",
            Self::PageLimit => "page_limit",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Everything a finished crawl hands back to its caller
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Extracted discussion bodies, page 1 first; unordered within a page
    pub bodies: Vec<String>,

    /// Why the crawl ended
    pub stop_reason: StopReason,

    /// Request and extraction counters
    pub stats: CrawlStats,
}

/// Running state of a single crawl invocation
///
/// A fresh value is built for every crawl and consumed by [`finish`](Self::finish),
/// so nothing is ever carried over from one crawl to the next.
#[derive(Debug)]
pub struct CrawlState {
    /// Current listing page number, starting at 1
    page: u32,

    /// Phase of the page cycle
    phase: CrawlPhase,

    /// Body texts collected so far, in page order
    bodies: Vec<String>,

    stats: CrawlStats,

    started: Instant,
}

impl CrawlState {
    /// Creates the state for a crawl that starts on page 1
    pub fn new() -> Self {
        Self {
            page: 1,
            phase: CrawlPhase::FetchingListing,
            bodies: Vec::new(),
            stats: CrawlStats::started(Utc::now()),
            started: Instant::now(),
        }
    }

    /// Current listing page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Current phase
    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Number of body texts collected so far
    pub fn collected(&self) -> usize {
        self.bodies.len()
    }

    /// Moves to the next phase of the page cycle
    pub fn transition(&mut self, next: CrawlPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "invalid crawl phase transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!(page = self.page, "crawl phase {} -> {}", self.phase, next);
        self.phase = next;
    }

    /// Records a successfully fetched listing page and its link count
    pub fn record_listing(&mut self, links: usize) {
        self.stats.listing_pages += 1;
        self.stats.links_found += links as u64;
    }

    /// Appends the outcome of one page's detail batch and advances the page counter
    pub fn absorb_page(&mut self, bodies: Vec<String>, fetched: u64, skipped: u64) {
        self.stats.detail_pages += fetched;
        self.stats.detail_skipped += skipped;
        self.stats.empty_bodies += bodies.iter().filter(|b| b.is_empty()).count() as u64;
        self.bodies.extend(bodies);
        self.page += 1;
    }

    /// Ends the crawl and hands the collected text over
    pub fn finish(mut self, stop_reason: StopReason) -> CrawlReport {
        if !self.phase.is_terminal() {
            self.transition(CrawlPhase::Done);
        }
        self.stats.bodies = self.bodies.len() as u64;
        self.stats.finish(Utc::now(), self.started.elapsed());

        CrawlReport {
            bodies: self.bodies,
            stop_reason,
            stats: self.stats,
        }
    }
}

impl Default for CrawlState {
    fn default() -> Self {
        Self::new()
    }
}
