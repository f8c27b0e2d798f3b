//! Output module for word counts and crawl summaries
//!
//! This module handles:
//! - Folding discussion bodies into a word frequency table
//! - Writing the table as a CSV report
//! - Recording and printing crawl statistics

mod report;
pub mod stats;
mod word_counts;

pub use report::{write_word_counts, write_word_counts_csv};
pub use stats::{print_crawl_summary, CrawlStats};
pub use word_counts::{count_words, WordCounts};

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
