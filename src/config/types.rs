use serde::Deserialize;

/// Main configuration structure for Thread-Tally
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of requests in flight at the same time
    #[serde(
        rename = "max-concurrent-requests",
        default = "default_max_concurrent_requests"
    )]
    pub max_concurrent_requests: u32,

    /// Timeout applied to every single request (milliseconds)
    #[serde(rename = "request-timeout-ms", default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Stop after this many listing pages; 0 means no limit
    #[serde(rename = "max-pages", default)]
    pub max_pages: u32,
}

impl CrawlerConfig {
    /// Returns the page guard as an option, `None` meaning unbounded
    pub fn page_limit(&self) -> Option<u32> {
        (self.max_pages > 0).then_some(self.max_pages)
    }
}

fn default_max_concurrent_requests() -> u32 {
    10
}

fn default_request_timeout_ms() -> u64 {
    30_000
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// The search whose result pages are crawled
///
/// Every field maps onto one query parameter of the listing endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Origin the search path and all discussion links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the search listing endpoint
    pub path: String,

    /// Search terms (`q`)
    pub query: String,

    pub filter: String,

    #[serde(rename = "no-synonym")]
    pub no_synonym: bool,

    pub advanced: bool,

    #[serde(rename = "range-time")]
    pub range_time: String,

    /// Board the search is restricted to
    pub location: String,

    #[serde(rename = "sort-by")]
    pub sort_by: String,

    #[serde(rename = "collapse-discussion")]
    pub collapse_discussion: bool,

    #[serde(rename = "search-type")]
    pub search_type: String,

    /// Results per listing page (`search_page_size`)
    #[serde(rename = "page-size")]
    pub page_size: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "https://community.shopify.com".to_string(),
            path: "/c/forums/searchpage/tab/message".to_string(),
            query: "review app".to_string(),
            filter: "location,dateRangeType".to_string(),
            no_synonym: false,
            advanced: true,
            range_time: "1y".to_string(),
            location: "forum-board:shopify-discussion".to_string(),
            sort_by: "score".to_string(),
            collapse_discussion: true,
            search_type: "thread".to_string(),
            page_size: 50,
        }
    }
}

/// CSS selectors used to pull links and text out of fetched pages
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Anchors on a listing page pointing at a full discussion
    #[serde(rename = "child-link")]
    pub child_link: String,

    /// Element holding the message body on a discussion page
    #[serde(rename = "body-container")]
    pub body_container: String,

    /// Paragraph elements directly under the body container
    #[serde(rename = "body-paragraph")]
    pub body_paragraph: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            child_link: "a.page-link.lia-link-navigation.lia-custom-event".to_string(),
            body_container: "div.lia-component-topic-message div.lia-message-body-content"
                .to_string(),
            body_paragraph: "p".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the word count CSV file
    #[serde(rename = "csv-path")]
    pub csv_path: String,
}
