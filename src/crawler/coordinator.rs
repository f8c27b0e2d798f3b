//! Crawler coordinator - pagination crawl orchestration
//!
//! This module contains the crawl loop that walks the search listing page by
//! page:
//! - Fetching a listing page and extracting its discussion links
//! - Fetching every linked discussion page concurrently
//! - Extracting the message body of each discussion
//! - Stopping on the first listing page without links
//!
//! Listing failures end the crawl with an error; a discussion page that fails
//! is logged and left out.

use crate::config::{Config, SearchConfig};
use crate::crawler::extractor::Extractor;
use crate::crawler::fetcher::{
    build_http_client, FetchError, FetchRequest, Fetcher, HttpTransport, Transport,
};
use crate::crawler::limiter::ConcurrencyLimiter;
use crate::state::{CancelFlag, CrawlPhase, CrawlReport, CrawlState, StopReason};
use crate::url::parse_base_url;
use crate::TallyError;
use futures::stream::{FuturesUnordered, StreamExt};
use std::time::Duration;

/// Outcome of fetching all discussion pages of one listing page
#[derive(Debug, Default)]
struct DetailBatch {
    bodies: Vec<String>,
    fetched: u64,
    skipped: u64,
}

/// Main crawler coordinator structure
pub struct Coordinator<T> {
    fetcher: Fetcher<T>,
    extractor: Extractor,
    search: SearchConfig,
    max_pages: Option<u32>,
}

impl Coordinator<HttpTransport> {
    /// Creates a coordinator that talks HTTP, as described by the configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `cancel` - Stop signal; set it to end the crawl early
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(TallyError)` - Invalid origin, selectors or HTTP client setup
    pub fn from_config(config: &Config, cancel: CancelFlag) -> Result<Self, TallyError> {
        let timeout = Duration::from_millis(config.crawler.request_timeout_ms);
        let client = build_http_client(&config.user_agent, timeout)?;
        let base_url = parse_base_url(&config.search.base_url)?;
        let limiter = ConcurrencyLimiter::new(config.crawler.max_concurrent_requests as usize);

        let fetcher = Fetcher::new(HttpTransport::new(client, base_url), limiter, timeout)
            .with_cancel(cancel);
        let extractor = Extractor::new(&config.selectors)?;

        Ok(Self::new(fetcher, extractor, config.search.clone())
            .with_page_limit(config.crawler.page_limit()))
    }
}

impl<T: Transport> Coordinator<T> {
    /// Creates a coordinator from its parts
    pub fn new(fetcher: Fetcher<T>, extractor: Extractor, search: SearchConfig) -> Self {
        Self {
            fetcher,
            extractor,
            search,
            max_pages: None,
        }
    }

    /// Stops after `max_pages` listing pages; `None` crawls until the results run out
    pub fn with_page_limit(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn fetcher(&self) -> &Fetcher<T> {
        &self.fetcher
    }

    /// Builds the request for one listing page of the search
    pub fn listing_request(&self, page: u32) -> FetchRequest {
        let search = &self.search;

        FetchRequest::new(search.path.as_str())
            .with_param("filter", search.filter.as_str())
            .with_param("q", search.query.as_str())
            .with_param("noSynonym", search.no_synonym.to_string())
            .with_param("advanced", search.advanced.to_string())
            .with_param("rangeTime", search.range_time.as_str())
            .with_param("location", search.location.as_str())
            .with_param("sort_by", search.sort_by.as_str())
            .with_param("collapse_discussion", search.collapse_discussion.to_string())
            .with_param("search_type", search.search_type.as_str())
            .with_param("search_page_size", search.page_size.to_string())
            .with_param("page", page.to_string())
    }

    /// Runs the crawl to completion
    ///
    /// Each iteration handles one listing page. The next listing page is only
    /// requested once every discussion of the current one has been fetched
    /// and its text collected, so bodies stay grouped by page.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Pagination ran out, the page limit was hit, or
    ///   the crawl was cancelled
    /// * `Err(TallyError)` - A listing page could not be fetched or parsed
    pub async fn run(&self) -> Result<CrawlReport, TallyError> {
        let mut state = CrawlState::new();

        loop {
            if self.fetcher.cancel_flag().is_cancelled() {
                tracing::info!("Crawl cancelled before page #{}", state.page());
                return Ok(state.finish(StopReason::Cancelled));
            }

            if let Some(limit) = self.max_pages {
                if state.page() > limit {
                    tracing::info!("Reached page limit of {}", limit);
                    return Ok(state.finish(StopReason::PageLimit));
                }
            }

            let page = state.page();
            tracing::info!("Fetching page #{}", page);

            let listing = match self.fetcher.fetch(&self.listing_request(page)).await {
                Ok(listing) => listing,
                Err(FetchError::Cancelled { .. }) => {
                    tracing::info!("Crawl cancelled before page #{}", page);
                    return Ok(state.finish(StopReason::Cancelled));
                }
                Err(source) => return Err(TallyError::ListingFetch { page, source }),
            };

            state.transition(CrawlPhase::ExtractingLinks);
            let links = self
                .extractor
                .listing_links(&listing.body)
                .map_err(|source| TallyError::ListingParse { page, source })?;
            state.record_listing(links.len());

            if links.is_empty() {
                tracing::info!("Page #{} has no discussion links, pagination ends", page);
                return Ok(state.finish(StopReason::Exhausted));
            }

            tracing::debug!("Page #{}: {} discussion links", page, links.len());
            state.transition(CrawlPhase::FetchingDetails);

            let batch = self.fetch_details(&links).await;
            if batch.skipped > 0 {
                tracing::warn!(
                    "Page #{}: skipped {} of {} discussions",
                    page,
                    batch.skipped,
                    links.len()
                );
            }
            state.absorb_page(batch.bodies, batch.fetched, batch.skipped);
            state.transition(CrawlPhase::FetchingListing);
        }
    }

    /// Fetches all discussion pages of one listing page at once
    ///
    /// Every request still goes through the shared limiter. Bodies come back
    /// in completion order.
    async fn fetch_details(&self, links: &[String]) -> DetailBatch {
        let mut pending: FuturesUnordered<_> =
            links.iter().map(|link| self.fetch_detail(link)).collect();

        let mut batch = DetailBatch::default();
        while let Some(outcome) = pending.next().await {
            match outcome {
                Some(body) => {
                    batch.fetched += 1;
                    batch.bodies.push(body);
                }
                None => batch.skipped += 1,
            }
        }

        batch
    }

    /// Fetches one discussion page and extracts its body
    ///
    /// Returns `None` when the page is skipped.
    async fn fetch_detail(&self, link: &str) -> Option<String> {
        tracing::debug!("Fetching {}", link);

        let document = match self.fetcher.fetch(&FetchRequest::new(link)).await {
            Ok(document) => document,
            Err(FetchError::Cancelled { .. }) => {
                tracing::debug!("Not fetching {}, crawl cancelled", link);
                return None;
            }
            Err(e) => {
                tracing::warn!("Skipping discussion {}: {}", link, e);
                return None;
            }
        };

        match self.extractor.detail_text(&document.body) {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!("Skipping discussion {}: {}", link, e);
                None
            }
        }
    }
}
