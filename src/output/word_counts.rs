//! Word frequency counting
//!
//! Turns the collected discussion bodies into a frequency table. Only purely
//! alphabetic whitespace-separated tokens are counted, so `app.` or `5star`
//! are dropped rather than trimmed.

use std::collections::HashMap;

/// Word frequencies, most frequent first
///
/// Words with the same count keep the order in which they were first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordCounts {
    entries: Vec<(String, u64)>,
}

impl WordCounts {
    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of counted words
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    /// Count for a single (lowercase) word
    pub fn get(&self, word: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(w, _)| w == word)
            .map(|(_, count)| *count)
    }

    /// Iterates over `(word, count)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(w, c)| (w.as_str(), *c))
    }

    pub fn into_entries(self) -> Vec<(String, u64)> {
        self.entries
    }
}

/// Normalizes a token, returning `None` if it should not be counted
fn normalize_token(token: &str) -> Option<String> {
    if token.is_empty() || !token.chars().all(char::is_alphabetic) {
        return None;
    }
    Some(token.to_lowercase())
}

/// Counts words across all texts
///
/// # Example
///
/// ```
/// use thread_tally::output::count_words;
///
/// let counts = count_words(["Great app, great support", "Great"]);
/// assert_eq!(counts.get("great"), Some(3));
/// assert_eq!(counts.get("app"), None); // "app," is not alphabetic
/// ```
pub fn count_words<I, S>(texts: I) -> WordCounts
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    // word -> (count, first seen)
    let mut counts: HashMap<String, (u64, usize)> = HashMap::new();
    let mut seen = 0usize;

    for text in texts {
        for word in text.as_ref().split_whitespace().filter_map(normalize_token) {
            let entry = counts.entry(word).or_insert_with(|| {
                seen += 1;
                (0, seen)
            });
            entry.0 += 1;
        }
    }

    let mut entries: Vec<(String, u64, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.2.cmp(&b.2)));

    WordCounts {
        entries: entries
            .into_iter()
            .map(|(word, count, _)| (word, count))
            .collect(),
    }
}
