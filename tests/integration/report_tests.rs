//! End-to-end tests from a config file on disk to the word count CSV

use crate::crawl_tests::{discussion_html, listing_html};
use std::io::Write;
use thread_tally::config::load_config;
use thread_tally::output::{count_words, write_word_counts_csv};
use thread_tally::{crawl, CancelFlag};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_config(dir: &tempfile::TempDir, base_url: &str) -> std::path::PathBuf {
    let csv_path = dir.path().join("word_counts.csv");
    let config_path = dir.path().join("thread-tally.toml");
    let contents = format!(
        r#"
[crawler]
max-concurrent-requests = 2
request-timeout-ms = 2000

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[search]
base-url = "{}"
query = "review app"

[output]
csv-path = "{}"
"#,
        base_url,
        csv_path.display()
    );

    let mut file = std::fs::File::create(&config_path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    config_path
}

#[tokio::test]
async fn test_config_to_csv() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/c/forums/searchpage/tab/message"))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(listing_html(&["/t5/one", "/t5/two"])),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/c/forums/searchpage/tab/message"))
        .respond_with(ResponseTemplate::new(200).set_body_string(listing_html(&[])))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/t5/one"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(discussion_html(&["Great app, great reviews!"])),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/t5/two"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(discussion_html(&["The app is GREAT"])),
        )
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &mock_server.uri());
    let config = load_config(&config_path).unwrap();

    let report = crawl(&config, CancelFlag::new()).await.unwrap();
    assert_eq!(report.bodies.len(), 2);

    let counts = count_words(&report.bodies);
    // "app," and "reviews!" carry punctuation and are not purely alphabetic
    assert_eq!(counts.get("great"), Some(3));
    assert_eq!(counts.get("app"), Some(1));
    assert_eq!(counts.get("reviews"), None);
    assert_eq!(counts.get("reply"), None);

    let csv_path = std::path::PathBuf::from(&config.output.csv_path);
    write_word_counts_csv(&counts, &csv_path).unwrap();

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let rows: Vec<(String, u64)> = reader.deserialize().map(|r| r.unwrap()).collect();
    assert_eq!(rows[0], ("great".to_string(), 3));
    assert_eq!(rows.iter().map(|(_, c)| c).sum::<u64>(), counts.total());
}
