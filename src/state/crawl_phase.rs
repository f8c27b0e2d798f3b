/// Phase definitions for the pagination crawl
///
/// A crawl cycles through these phases once per listing page until it reaches `Done`.
use std::fmt;

/// Represents the phase the pagination crawl is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// Requesting the listing page for the current page number
    FetchingListing,

    /// Pulling discussion links out of the fetched listing page
    ExtractingLinks,

    /// Fetching every discussion page linked from the listing page
    FetchingDetails,

    /// No further requests will be issued
    Done,
}

impl CrawlPhase {
    /// Returns true if this is the terminal phase
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Returns true if the crawl issues requests in this phase
    pub fn issues_requests(&self) -> bool {
        matches!(self, Self::FetchingListing | Self::FetchingDetails)
    }

    /// Checks whether moving from this phase to `next` is allowed
    ///
    /// `Done` is reachable from every phase so that cancellation and the page
    /// guard can stop the crawl at any point.
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        match (self, next) {
            (Self::Done, _) => false,
            (_, Self::Done) => true,
            (Self::FetchingListing, Self::ExtractingLinks) => true,
            (Self::ExtractingLinks, Self::FetchingDetails) => true,
            (Self::FetchingDetails, Self::FetchingListing) => true,
            _ => false,
        }
    }

    /// Short lowercase name used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FetchingListing => "fetching_listing",
            Self::ExtractingLinks => "extracting_links",
            Self::FetchingDetails => "fetching_details",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
