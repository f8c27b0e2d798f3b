//! URL handling for Thread-Tally
//!
//! Listing and discussion links come back relative to the forum origin, so
//! every request target goes through [`resolve_target`] before it is sent.

use crate::{UrlError, UrlResult};
use url::Url;

/// Parses the configured origin, accepting only http and https
pub fn parse_base_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;
    ensure_http(url)
}

/// Resolves a request target against the base URL
///
/// Relative targets (`/t5/...`) are joined onto the base. Absolute targets
/// are accepted only when they share the base's origin. Targets that end up
/// outside http(s), such as `javascript:` or `mailto:` links, are rejected.
///
/// # Examples
///
/// ```
/// use thread_tally::url::{parse_base_url, resolve_target};
///
/// let base = parse_base_url("https://forum.example.com").unwrap();
/// let url = resolve_target(&base, "/t5/thread/td-p/42").unwrap();
/// assert_eq!(url.as_str(), "https://forum.example.com/t5/thread/td-p/42");
/// ```
pub fn resolve_target(base: &Url, target: &str) -> UrlResult<Url> {
    let target = target.trim();

    if target.is_empty() {
        return Err(UrlError::Parse("empty link target".to_string()));
    }

    let url = base
        .join(target)
        .map_err(|e| UrlError::Parse(format!("{}: {}", target, e)))?;
    let url = ensure_http(url)?;

    if url.origin() != base.origin() {
        return Err(UrlError::ForeignOrigin(url.to_string()));
    }
    Ok(url)
}

fn ensure_http(url: Url) -> UrlResult<Url> {
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UrlError::InvalidScheme(other.to_string())),
    }
}
