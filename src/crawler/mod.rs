//! Crawler module for forum search pagination
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching under a global concurrency limit
//! - HTML parsing and link/body extraction
//! - Listing page pagination and discussion page fan-out

mod coordinator;
mod extractor;
mod fetcher;
mod limiter;

pub use coordinator::Coordinator;
pub use extractor::{parse_document, ExtractError, Extractor};
pub use fetcher::{
    build_http_client, user_agent_string, FetchError, FetchRequest, FetchResult, FetchedDocument,
    Fetcher, HttpTransport, Transport,
};
pub use limiter::{ConcurrencyLimiter, RequestSlot};

use crate::config::Config;
use crate::state::{CancelFlag, CrawlReport};
use crate::TallyError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client and the shared concurrency limiter
/// 2. Walk the search listing page by page
/// 3. Fetch and extract every linked discussion
/// 4. Stop on the first listing page without links
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `cancel` - Stop signal; in-flight requests drain and the partial result is returned
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished, possibly early
/// * `Err(TallyError)` - Setup failed or a listing page could not be obtained
///
/// # Example
///
/// ```no_run
/// use thread_tally::config::load_config;
/// use thread_tally::crawler::crawl;
/// use thread_tally::CancelFlag;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let report = crawl(&config, CancelFlag::new()).await?;
/// println!("{} discussions collected", report.bodies.len());
/// # Ok(())
/// # }
/// ```
pub async fn crawl(config: &Config, cancel: CancelFlag) -> Result<CrawlReport, TallyError> {
    let coordinator = Coordinator::from_config(config, cancel)?;
    coordinator.run().await
}
