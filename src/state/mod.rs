//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the phase of the listing/detail page cycle
//! - `CrawlState`: per-crawl accumulator of extracted text and counters
//! - `CancelFlag`: shared stop signal checked before every request

mod cancel;
mod crawl_phase;
mod crawl_state;

// Re-export main types
pub use cancel::CancelFlag;
pub use crawl_phase::CrawlPhase;
pub use crawl_state::{CrawlReport, CrawlState, StopReason};
