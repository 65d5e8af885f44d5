//! Result deduplication by normalised URL.
//!
//! Keeps the first occurrence of every page and drops later ones, so the
//! surviving entry carries the source tag and rank of whichever engine was
//! merged first. Input order is preserved.

use std::collections::HashSet;

use crate::types::SearchResult;

use super::url_normalize::normalize_url;

/// Deduplicate `results` by normalised URL, first-seen wins.
pub fn deduplicate(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(results.len());
    let before = results.len();

    let unique: Vec<SearchResult> = results
        .into_iter()
        .filter(|result| seen.insert(normalize_url(&result.url)))
        .collect();

    let dropped = before - unique.len();
    if dropped > 0 {
        tracing::debug!(dropped, kept = unique.len(), "duplicate results removed");
    }
    unique
}
