//! Ordered selector strategies for HTML result pages.
//!
//! Scraped engines change their markup without notice, so each adapter keeps
//! several structurally different [`SelectorStrategy`] values, tried in
//! order. The first strategy that yields at least one result wins; if none
//! does, extraction yields an empty list rather than an error.

use scraper::{ElementRef, Html, Selector};

use crate::types::{EngineId, SearchResult};

/// Longest title kept from a scraped result, in characters.
const MAX_TITLE_CHARS: usize = 200;
/// Longest snippet kept from a scraped result, in characters.
const MAX_SNIPPET_CHARS: usize = 300;

/// One way of locating results in a document.
#[derive(Debug, Clone, Copy)]
pub struct SelectorStrategy {
    /// Label used in logs.
    pub name: &'static str,
    /// Selector for one result container.
    pub container: &'static str,
    /// Selector for the title element inside the container. `None` means the
    /// container itself is the title link.
    pub title: Option<&'static str>,
    /// Selector for the snippet inside the container. `None` leaves snippets empty.
    pub snippet: Option<&'static str>,
    /// Titles shorter than this (in characters) are skipped.
    pub min_title_chars: usize,
}

impl SelectorStrategy {
    /// A container/title/snippet strategy with no title length floor.
    pub const fn new(
        name: &'static str,
        container: &'static str,
        title: &'static str,
        snippet: &'static str,
    ) -> Self {
        Self {
            name,
            container,
            title: Some(title),
            snippet: Some(snippet),
            min_title_chars: 1,
        }
    }
}

/// Selectors of one strategy, parsed.
struct Compiled {
    container: Selector,
    title: Option<Selector>,
    snippet: Option<Selector>,
    link: Selector,
}

fn compile(strategy: &SelectorStrategy) -> Option<Compiled> {
    let parse = |s: &'static str| match Selector::parse(s) {
        Ok(sel) => Some(sel),
        Err(e) => {
            tracing::debug!(strategy = strategy.name, selector = s, error = ?e, "invalid selector");
            None
        }
    };
    Some(Compiled {
        container: parse(strategy.container)?,
        title: match strategy.title {
            Some(t) => Some(parse(t)?),
            None => None,
        },
        snippet: match strategy.snippet {
            Some(s) => Some(parse(s)?),
            None => None,
        },
        link: parse("a[href]")?,
    })
}

/// Run `strategies` in order against `html` and return the first non-empty
/// extraction.
///
/// `resolve_url` receives each raw `href` and returns the URL to keep, or
/// `None` to drop the candidate (redirect wrappers, internal links).
pub fn extract_first<F>(
    html: &str,
    strategies: &[SelectorStrategy],
    engine: EngineId,
    max_results: usize,
    resolve_url: F,
) -> Vec<SearchResult>
where
    F: Fn(&str) -> Option<String>,
{
    let document = Html::parse_document(html);

    for strategy in strategies {
        let Some(compiled) = compile(strategy) else {
            continue;
        };
        let results = extract(&document, strategy, &compiled, engine, max_results, &resolve_url);
        if !results.is_empty() {
            tracing::debug!(%engine, strategy = strategy.name, count = results.len(), "results parsed");
            return results;
        }
        tracing::trace!(%engine, strategy = strategy.name, "strategy matched nothing");
    }

    tracing::debug!(%engine, "no selector strategy matched");
    Vec::new()
}

fn extract<F>(
    document: &Html,
    strategy: &SelectorStrategy,
    compiled: &Compiled,
    engine: EngineId,
    max_results: usize,
    resolve_url: &F,
) -> Vec<SearchResult>
where
    F: Fn(&str) -> Option<String>,
{
    let mut results: Vec<SearchResult> = Vec::new();

    for container in document.select(&compiled.container) {
        let title_el = match compiled.title {
            Some(ref sel) => match container.select(sel).next() {
                Some(el) => el,
                None => continue,
            },
            None => container,
        };

        let title = clean_text(title_el);
        if title.chars().count() < strategy.min_title_chars.max(1) {
            continue;
        }

        let Some(href) = find_href(title_el, container, &compiled.link) else {
            continue;
        };
        let Some(url) = resolve_url(href) else {
            continue;
        };
        if results.iter().any(|r| r.url == url) {
            continue;
        }

        let snippet = compiled
            .snippet
            .as_ref()
            .and_then(|sel| container.select(sel).next())
            .map(clean_text)
            .unwrap_or_default();

        let rank = u32::try_from(results.len() + 1).unwrap_or(u32::MAX);
        results.push(SearchResult {
            source: engine.name().to_owned(),
            title: truncate_chars(&title, MAX_TITLE_CHARS),
            url,
            snippet: truncate_chars(&snippet, MAX_SNIPPET_CHARS),
            rank,
        });

        if results.len() >= max_results {
            break;
        }
    }

    results
}

/// The title element's own `href`, else the first link inside it, else the
/// first link in the container.
fn find_href<'a>(
    title_el: ElementRef<'a>,
    container: ElementRef<'a>,
    link: &Selector,
) -> Option<&'a str> {
    title_el
        .value()
        .attr("href")
        .or_else(|| title_el.select(link).next().and_then(|a| a.value().attr("href")))
        .or_else(|| container.select(link).next().and_then(|a| a.value().attr("href")))
        .map(str::trim)
        .filter(|h| !h.is_empty())
}

/// Element text with whitespace runs collapsed.
fn clean_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_owned(),
        None => s.to_owned(),
    }
}

/// Keep absolute `http(s)` links only.
pub fn absolute_http(href: &str) -> Option<String> {
    (href.starts_with("http://") || href.starts_with("https://")).then(|| href.to_owned())
}
