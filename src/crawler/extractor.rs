//! HTML extraction for listing and discussion pages
//!
//! Documents are parsed with html5ever through `scraper`, which recovers from
//! missing closing tags and stray text the way a browser does. Extraction
//! itself never fails: a page without matching elements simply yields no
//! links or an empty body.

use crate::config::SelectorConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// A fetched payload that is not an HTML document at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("document is empty")]
    Empty,
}

/// Parses a raw response body into a document tree
///
/// Markup errors are tolerated, and so are invalid UTF-8 sequences, which
/// become U+FFFD. Only bodies containing nothing but whitespace are rejected.
pub fn parse_document(body: &[u8]) -> Result<Html, ExtractError> {
    let source = String::from_utf8_lossy(body);

    if source.trim().is_empty() {
        return Err(ExtractError::Empty);
    }

    Ok(Html::parse_document(&source))
}

/// Selector-based extraction of discussion links and message bodies
#[derive(Debug, Clone)]
pub struct Extractor {
    child_link: Selector,
    body_container: Selector,
    body_paragraph: Selector,
}

impl Extractor {
    /// Compiles the configured selectors
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            child_link: compile(&config.child_link)?,
            body_container: compile(&config.body_container)?,
            body_paragraph: compile(&config.body_paragraph)?,
        })
    }

    /// Returns the `href` of every discussion link, in document order
    ///
    /// An empty result is how the last page of a search shows itself.
    ///
    /// # Example
    ///
    /// ```
    /// use scraper::Html;
    /// use thread_tally::config::SelectorConfig;
    /// use thread_tally::crawler::Extractor;
    ///
    /// let extractor = Extractor::new(&SelectorConfig::default()).unwrap();
    /// let doc = Html::parse_document(
    ///     r#"<a class="page-link lia-link-navigation lia-custom-event" href="/t5/1">x</a>"#,
    /// );
    /// assert_eq!(extractor.child_links(&doc), vec!["/t5/1"]);
    /// ```
    pub fn child_links(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.child_link)
            .filter_map(|element| element.value().attr("href"))
            .map(|href| href.to_string())
            .collect()
    }

    /// Concatenates the paragraph text of the message body
    ///
    /// Paragraphs are the direct children of the body container matching the
    /// paragraph selector. Only their own text nodes are taken, nested markup
    /// such as links or emphasis is left out. Pieces are joined with no
    /// separator.
    pub fn body_text(&self, document: &Html) -> String {
        let mut text = String::new();

        for container in document.select(&self.body_container) {
            for child in container.children() {
                let Some(paragraph) = ElementRef::wrap(child) else {
                    continue;
                };
                if !self.body_paragraph.matches(&paragraph) {
                    continue;
                }

                for node in paragraph.children() {
                    if let Some(fragment) = node.value().as_text() {
                        text.push_str(fragment);
                    }
                }
            }
        }

        text
    }

    /// Parses a listing page body and returns its discussion links
    pub fn listing_links(&self, body: &[u8]) -> Result<Vec<String>, ExtractError> {
        let document = parse_document(body)?;
        Ok(self.child_links(&document))
    }

    /// Parses a discussion page body and returns its message text
    pub fn detail_text(&self, body: &[u8]) -> Result<String, ExtractError> {
        let document = parse_document(body)?;
        Ok(self.body_text(&document))
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {:?}", selector, e)))
}
