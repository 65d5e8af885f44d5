//! Core types for search results and engine identification.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single search result produced by one engine adapter.
///
/// Immutable once produced. `rank` is the 1-based position of the result in
/// the page returned by `source`, so ordering within one engine survives
/// merging and deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display name of the engine that produced this result.
    pub source: String,
    /// The title of the result page.
    pub title: String,
    /// The URL of the result page.
    pub url: String,
    /// A text snippet summarising the page content. May be empty.
    pub snippet: String,
    /// 1-based position within `source`'s result list.
    pub rank: u32,
}

/// Search backends the aggregator knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineId {
    /// Bing HTML results page.
    Bing,
    /// SearXNG public instances (a meta-engine over several backends).
    Searx,
    /// DuckDuckGo HTML-only endpoint.
    DuckDuckGo,
    /// Qwant JSON API with an HTML scraping fallback.
    Qwant,
    /// Mojeek, an independent index.
    Mojeek,
    /// Yep (Ahrefs).
    Yep,
    /// Startpage, proxied Google results.
    Startpage,
}

impl EngineId {
    /// Returns the human-readable name of this engine, used as the result source tag.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bing => "Bing",
            Self::Searx => "Searx",
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Qwant => "Qwant",
            Self::Mojeek => "Mojeek",
            Self::Yep => "Yep",
            Self::Startpage => "Startpage",
        }
    }

    /// Returns the stable lowercase identifier used in configuration files.
    pub fn id(&self) -> &'static str {
        match self {
            Self::Bing => "bing",
            Self::Searx => "searx",
            Self::DuckDuckGo => "duckduckgo",
            Self::Qwant => "qwant",
            Self::Mojeek => "mojeek",
            Self::Yep => "yep",
            Self::Startpage => "startpage",
        }
    }

    /// Returns all available engine variants in registration order.
    pub fn all() -> &'static [EngineId] {
        &[
            Self::Bing,
            Self::Searx,
            Self::DuckDuckGo,
            Self::Qwant,
            Self::Mojeek,
            Self::Yep,
            Self::Startpage,
        ]
    }
}

impl fmt::Display for EngineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        match wanted.as_str() {
            "ddg" => return Ok(Self::DuckDuckGo),
            "searxng" => return Ok(Self::Searx),
            _ => {}
        }
        Self::all()
            .iter()
            .copied()
            .find(|engine| engine.id() == wanted)
            .ok_or_else(|| format!("unknown search engine: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_result_serde_round_trip() {
        let result = SearchResult {
            source: "Bing".into(),
            title: "Test".into(),
            url: "https://test.com".into(),
            snippet: "snippet".into(),
            rank: 1,
        };
        let json = serde_json::to_string(&result).expect("serialize");
        let decoded: SearchResult = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(decoded, result);
    }

    #[test]
    fn engine_display_uses_name() {
        assert_eq!(EngineId::DuckDuckGo.to_string(), "DuckDuckGo");
        assert_eq!(EngineId::Searx.to_string(), "Searx");
        assert_eq!(EngineId::Startpage.to_string(), "Startpage");
    }

    #[test]
    fn engine_all_has_seven_variants() {
        let all = EngineId::all();
        assert_eq!(all.len(), 7);
        assert_eq!(all[0], EngineId::Bing);
        assert!(all.contains(&EngineId::Yep));
    }

    #[test]
    fn engine_from_str_accepts_ids_and_aliases() {
        assert_eq!("bing".parse::<EngineId>(), Ok(EngineId::Bing));
        assert_eq!("DuckDuckGo".parse::<EngineId>(), Ok(EngineId::DuckDuckGo));
        assert_eq!("ddg".parse::<EngineId>(), Ok(EngineId::DuckDuckGo));
        assert_eq!(" searxng ".parse::<EngineId>(), Ok(EngineId::Searx));
        assert!("altavista".parse::<EngineId>().is_err());
    }

    #[test]
    fn engine_id_round_trips_through_from_str() {
        for engine in EngineId::all() {
            assert_eq!(engine.id().parse::<EngineId>(), Ok(*engine));
        }
    }

    #[test]
    fn engine_serde_uses_lowercase_ids() {
        let json = serde_json::to_string(&EngineId::DuckDuckGo).expect("serialize");
        assert_eq!(json, "\"duckduckgo\"");
        let decoded: EngineId = serde_json::from_str("\"mojeek\"").expect("deserialize");
        assert_eq!(decoded, EngineId::Mojeek);
    }
}
