//! Crawl statistics
//!
//! Counters gathered while a crawl runs, plus a plain-text summary printed
//! once it is over.

use crate::output::WordCounts;
use crate::state::CrawlReport;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Request and extraction counters for one crawl
#[derive(Debug, Clone)]
pub struct CrawlStats {
    /// Listing pages fetched, the terminal empty page included
    pub listing_pages: u64,

    /// Discussion links found across all listing pages
    pub links_found: u64,

    /// Discussion pages fetched and extracted
    pub detail_pages: u64,

    /// Discussion pages left out after a fetch or parse failure
    pub detail_skipped: u64,

    /// Discussions whose body came out empty
    pub empty_bodies: u64,

    /// Body texts handed to the word counter
    pub bodies: u64,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    /// Wall-clock duration of the crawl
    pub elapsed: Duration,
}

impl CrawlStats {
    /// Creates empty counters for a crawl starting at `started_at`
    pub fn started(started_at: DateTime<Utc>) -> Self {
        Self {
            listing_pages: 0,
            links_found: 0,
            detail_pages: 0,
            detail_skipped: 0,
            empty_bodies: 0,
            bodies: 0,
            started_at,
            finished_at: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Marks the crawl as finished
    pub fn finish(&mut self, finished_at: DateTime<Utc>, elapsed: Duration) {
        self.finished_at = Some(finished_at);
        self.elapsed = elapsed;
    }

    /// Returns the share of discussion pages that were extracted, as a percentage
    pub fn success_rate(&self) -> f64 {
        let attempted = self.detail_pages + self.detail_skipped;
        if attempted == 0 {
            return 0.0;
        }
        (self.detail_pages as f64 / attempted as f64) * 100.0
    }

    /// Returns discussion pages per second over the whole crawl
    pub fn pages_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.detail_pages as f64 / secs
    }
}

/// Prints a crawl summary to stdout
///
/// # Arguments
///
/// * `report` - The finished crawl
/// * `counts` - Word counts computed from the crawl's bodies
/// * `top` - How many of the most frequent words to list
pub fn print_crawl_summary(report: &CrawlReport, counts: &WordCounts, top: usize) {
    let stats = &report.stats;

    println!("=== Crawl Summary ===\n");

    println!("Run:");
    println!("  Started: {}", stats.started_at.to_rfc3339());
    if let Some(finished) = stats.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    println!("  Duration: {:.2}s", stats.elapsed.as_secs_f64());
    println!("  Stopped: {}", report.stop_reason);
    println!();

    println!("Pages:");
    println!("  Listing pages: {}", stats.listing_pages);
    println!("  Discussion links: {}", stats.links_found);
    println!(
        "  Discussions extracted: {} ({:.1}%)",
        stats.detail_pages,
        stats.success_rate()
    );
    println!("  Discussions skipped: {}", stats.detail_skipped);
    println!("  Empty bodies: {}", stats.empty_bodies);
    println!("  Rate: {:.2} discussions/sec", stats.pages_per_second());
    println!();

    println!("Words:");
    println!("  Distinct: {}", counts.len());
    println!("  Total: {}", counts.total());
    for (word, count) in counts.iter().take(top) {
        println!("  {:<20} {}", word, count);
    }
}
