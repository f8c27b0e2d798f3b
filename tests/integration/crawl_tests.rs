//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock forum servers and test the full
//! listing/discussion cycle end-to-end.

use std::time::Duration;
use thread_tally::config::{
    Config, CrawlerConfig, OutputConfig, SearchConfig, SelectorConfig, UserAgentConfig,
};
use thread_tally::crawler::crawl;
use thread_tally::{CancelFlag, FetchError, StopReason, TallyError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH_PATH: &str = "/c/forums/searchpage/tab/message";

/// Creates a test configuration pointing at the given mock server
pub fn create_test_config(base_url: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_concurrent_requests: 3,
            request_timeout_ms: 2_000,
            max_pages: 0,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        search: SearchConfig {
            base_url: base_url.to_string(),
            ..SearchConfig::default()
        },
        selectors: SelectorConfig::default(),
        output: OutputConfig {
            csv_path: "./test_word_counts.csv".to_string(),
        },
    }
}

pub fn listing_html(links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| {
            format!(
                r#"<li><a class="page-link lia-link-navigation lia-custom-event" href="{}">Read</a></li>"#,
                href
            )
        })
        .collect();
    format!(
        r#"<html><head><title>Search</title></head><body>
        <a class="lia-link-navigation" href="/t5/forum-home">Home</a>
        <ul>{}</ul>
        </body></html>"#,
        anchors
    )
}

pub fn discussion_html(paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{}</p>", p)).collect();
    format!(
        r#"<html><head><title>Discussion</title></head><body>
        <div class="lia-component-topic-message">
            <div class="lia-message-body-content">{}</div>
        </div>
        <div class="lia-component-reply">
            <div class="lia-message-body-content"><p>reply text</p></div>
        </div>
        </body></html>"#,
        body
    )
}

async fn mount_listing(server: &MockServer, page: u32, links: &[&str]) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", page.to_string().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(links)))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_discussion(server: &MockServer, link: &str, paragraphs: &[&str]) {
    Mock::given(method("GET"))
        .and(path(link))
        .respond_with(ResponseTemplate::new(200).set_body_string(discussion_html(paragraphs)))
        .expect(1)
        .mount(server)
        .await;
}

/// Any listing page not mounted explicitly has no results
async fn mount_empty_listing(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[])))
        .mount(server)
        .await;
}

fn sorted(mut bodies: Vec<String>) -> Vec<String> {
    bodies.sort();
    bodies
}

#[tokio::test]
async fn test_full_crawl_over_two_pages() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, &["/t5/a", "/t5/b", "/t5/c"]).await;
    mount_listing(&mock_server, 2, &["/t5/d", "/t5/e", "/t5/f"]).await;
    mount_empty_listing(&mock_server).await;

    for (link, text) in [
        ("/t5/a", "alpha"),
        ("/t5/b", "bravo"),
        ("/t5/c", "charlie"),
        ("/t5/d", "delta"),
        ("/t5/e", "echo"),
        ("/t5/f", "foxtrot"),
    ] {
        mount_discussion(&mock_server, link, &[text]).await;
    }

    let config = create_test_config(&mock_server.uri());
    let report = crawl(&config, CancelFlag::new()).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(report.bodies.len(), 6);
    assert_eq!(report.stats.listing_pages, 3);
    assert_eq!(report.stats.detail_pages, 6);

    // Page 1 bodies come before page 2 bodies
    assert_eq!(
        sorted(report.bodies[..3].to_vec()),
        vec!["alpha", "bravo", "charlie"]
    );
    assert_eq!(
        sorted(report.bodies[3..].to_vec()),
        vec!["delta", "echo", "foxtrot"]
    );
}

#[tokio::test]
async fn test_listing_request_carries_search_parameters() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("filter", "location,dateRangeType"))
        .and(query_param("q", "review app"))
        .and(query_param("noSynonym", "false"))
        .and(query_param("advanced", "true"))
        .and(query_param("rangeTime", "1y"))
        .and(query_param("location", "forum-board:shopify-discussion"))
        .and(query_param("sort_by", "score"))
        .and(query_param("collapse_discussion", "true"))
        .and(query_param("search_type", "thread"))
        .and(query_param("search_page_size", "50"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(&config, CancelFlag::new()).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert!(report.bodies.is_empty());
}

#[tokio::test]
async fn test_failed_discussion_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, &["/t5/a", "/t5/b", "/t5/c"]).await;
    mount_empty_listing(&mock_server).await;
    mount_discussion(&mock_server, "/t5/a", &["kept a"]).await;
    mount_discussion(&mock_server, "/t5/c", &["kept c"]).await;

    Mock::given(method("GET"))
        .and(path("/t5/b"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(&config, CancelFlag::new()).await.expect("Crawl failed");

    assert_eq!(sorted(report.bodies), vec!["kept a", "kept c"]);
    assert_eq!(report.stats.detail_skipped, 1);
}

#[tokio::test]
async fn test_timed_out_discussion_is_skipped() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, &["/t5/a", "/t5/slow", "/t5/c"]).await;
    mount_empty_listing(&mock_server).await;
    mount_discussion(&mock_server, "/t5/a", &["fast a"]).await;
    mount_discussion(&mock_server, "/t5/c", &["fast c"]).await;

    Mock::given(method("GET"))
        .and(path("/t5/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(discussion_html(&["too late"]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.request_timeout_ms = 300;

    let report = crawl(&config, CancelFlag::new()).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(sorted(report.bodies), vec!["fast a", "fast c"]);
    assert_eq!(report.stats.detail_skipped, 1);
}

#[tokio::test]
async fn test_listing_failure_fails_crawl() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, &["/t5/a"]).await;
    mount_discussion(&mock_server, "/t5/a", &["page one"]).await;

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let result = crawl(&config, CancelFlag::new()).await;

    match result {
        Err(TallyError::ListingFetch { page, source }) => {
            assert_eq!(page, 2);
            assert!(matches!(
                source,
                FetchError::Status {
                    status_code: 503,
                    ..
                }
            ));
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(report) => panic!("crawl should fail, got {} bodies", report.bodies.len()),
    }
}

#[tokio::test]
async fn test_page_limit_from_config() {
    let mock_server = MockServer::start().await;

    mount_listing(&mock_server, 1, &["/t5/a"]).await;
    mount_discussion(&mock_server, "/t5/a", &["only page"]).await;

    // Page 2 has results but must never be requested
    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&["/t5/b"])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.crawler.max_pages = 1;

    let report = crawl(&config, CancelFlag::new()).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::PageLimit);
    assert_eq!(report.bodies, vec!["only page"]);
}

#[tokio::test]
async fn test_cancelled_crawl_sends_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let cancel = CancelFlag::new();
    cancel.cancel();

    let config = create_test_config(&mock_server.uri());
    let report = crawl(&config, cancel).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::Cancelled);
    assert!(report.bodies.is_empty());
}

#[tokio::test]
async fn test_absolute_discussion_links() {
    let mock_server = MockServer::start().await;
    let absolute = format!("{}/t5/absolute", mock_server.uri());

    mount_listing(&mock_server, 1, &[absolute.as_str()]).await;
    mount_empty_listing(&mock_server).await;
    mount_discussion(&mock_server, "/t5/absolute", &["Hello ", "world."]).await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(&config, CancelFlag::new()).await.expect("Crawl failed");

    assert_eq!(report.bodies, vec!["Hello world."]);
}

#[tokio::test]
async fn test_latin1_listing_page_is_crawled() {
    let mock_server = MockServer::start().await;

    let mut listing = b"<html><head><title>R\xe9sultats</title></head><body>".to_vec();
    listing.extend_from_slice(
        br#"<a class="page-link lia-link-navigation lia-custom-event" href="/t5/a">Caf"#,
    );
    listing.extend_from_slice(b"\xe9</a></body></html>");

    Mock::given(method("GET"))
        .and(path(SEARCH_PATH))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(listing, "text/html; charset=iso-8859-1"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_empty_listing(&mock_server).await;
    mount_discussion(&mock_server, "/t5/a", &["still counted"]).await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(&config, CancelFlag::new()).await.expect("Crawl failed");

    assert_eq!(report.stop_reason, StopReason::Exhausted);
    assert_eq!(report.bodies, vec!["still counted"]);
}

#[tokio::test]
async fn test_foreign_origin_discussion_is_skipped() {
    let mock_server = MockServer::start().await;
    let elsewhere = MockServer::start().await;
    let foreign = format!("{}/t5/elsewhere", elsewhere.uri());

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(discussion_html(&["nope"])))
        .expect(0)
        .mount(&elsewhere)
        .await;

    mount_listing(&mock_server, 1, &["/t5/home", foreign.as_str()]).await;
    mount_empty_listing(&mock_server).await;
    mount_discussion(&mock_server, "/t5/home", &["home text"]).await;

    let config = create_test_config(&mock_server.uri());
    let report = crawl(&config, CancelFlag::new()).await.expect("Crawl failed");

    assert_eq!(report.bodies, vec!["home text"]);
    assert_eq!(report.stats.detail_skipped, 1);
}
