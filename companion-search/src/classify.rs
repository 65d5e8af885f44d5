//! Time-sensitivity classification of queries.
//!
//! [`classify`] maps a query to a [`QueryCategory`] by keyword matching and
//! derives the cache lifetime from a fixed table. Categories are checked in a
//! fixed priority order so a query matching several keyword sets always lands
//! in the same bucket: financial, regulatory, technical, current events,
//! environmental, business.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Time-sensitivity bucket of a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    /// Prices, rates, taxes, markets.
    Financial,
    /// Specifications, datasheets, benchmarks.
    Technical,
    /// News and anything "latest".
    CurrentEvents,
    /// Weather and environment.
    Environmental,
    /// Laws, regulation, licensing.
    Regulatory,
    /// Company and earnings information.
    Business,
    /// Nothing time-sensitive matched. Never cached.
    None,
}

impl QueryCategory {
    /// Cache lifetime for this category, in seconds. 0 means "do not cache".
    pub fn ttl_secs(self) -> u64 {
        const HOUR: u64 = 60 * 60;
        const DAY: u64 = 24 * HOUR;
        match self {
            Self::Financial => DAY,
            Self::Technical => 7 * DAY,
            Self::CurrentEvents => HOUR,
            Self::Environmental => 6 * HOUR,
            Self::Regulatory => 30 * DAY,
            Self::Business => 7 * DAY,
            Self::None => 0,
        }
    }

    /// Stable snake_case label, used in cache keys and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Technical => "technical",
            Self::CurrentEvents => "current_events",
            Self::Environmental => "environmental",
            Self::Regulatory => "regulatory",
            Self::Business => "business",
            Self::None => "none",
        }
    }
}

impl fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a query and the TTL derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryClassification {
    /// Matched category, or [`QueryCategory::None`].
    pub category: QueryCategory,
    /// `category.ttl_secs()`.
    pub ttl_secs: u64,
}

impl QueryClassification {
    fn of(category: QueryCategory) -> Self {
        Self {
            category,
            ttl_secs: category.ttl_secs(),
        }
    }

    /// Whether results for this query may be cached at all.
    pub fn is_cacheable(&self) -> bool {
        self.ttl_secs > 0
    }
}

/// Keyword sets in priority order. The first category with any keyword
/// contained in the lowercased query wins.
const KEYWORDS: &[(QueryCategory, &[&str])] = &[
    (
        QueryCategory::Financial,
        &[
            "price", "cost", "salary", "wage", "tax", "gst", "vat", "rate", "stock", "crypto",
            "currency", "exchange",
        ],
    ),
    (
        QueryCategory::Regulatory,
        &[
            "law",
            "legal",
            "regulation",
            "policy",
            "government",
            "compliance",
            "license",
            "permit",
        ],
    ),
    (
        QueryCategory::Technical,
        &[
            "specs",
            "specification",
            "technical details",
            "datasheet",
            "dimensions",
            "weight",
            "performance",
            "benchmark",
        ],
    ),
    (
        QueryCategory::CurrentEvents,
        &[
            "news", "current", "latest", "today", "recent", "update", "breaking", "announced",
        ],
    ),
    (
        QueryCategory::Environmental,
        &[
            "weather",
            "temperature",
            "climate",
            "forecast",
            "pollution",
            "air quality",
        ],
    ),
    (
        QueryCategory::Business,
        &[
            "company",
            "business",
            "revenue",
            "earnings",
            "quarterly",
            "annual report",
            "market cap",
        ],
    ),
];

/// Markers of image-generation prompts, which are never worth caching.
const IMAGE_MARKERS: &[&str] = &[
    "🖼️", "image:", ".png", ".jpg", ".jpeg", ".gif", ".bmp", ".webp",
];

/// Keywords this short only match a whole word (or its plural), so "tax"
/// does not fire on "syntax" nor "rate" on "generate".
const WHOLE_WORD_MAX_LEN: usize = 4;

/// Classify `query` by time sensitivity.
///
/// Empty or whitespace-only queries and image prompts classify as
/// [`QueryCategory::None`]. Longer keywords match as case-insensitive
/// substrings, so "prices" matches "price" and "update" matches "updated";
/// short ones must be a whole word, optionally pluralised.
pub fn classify(query: &str) -> QueryClassification {
    let lowered = query.trim().to_lowercase();
    if lowered.is_empty() || IMAGE_MARKERS.iter().any(|m| lowered.contains(m)) {
        return QueryClassification::of(QueryCategory::None);
    }

    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let category = KEYWORDS
        .iter()
        .find(|(_, words)| words.iter().any(|w| keyword_matches(w, &lowered, &tokens)))
        .map_or(QueryCategory::None, |(category, _)| *category);

    QueryClassification::of(category)
}

fn keyword_matches(keyword: &str, lowered: &str, tokens: &[&str]) -> bool {
    if keyword.len() > WHOLE_WORD_MAX_LEN || keyword.contains(' ') {
        return lowered.contains(keyword);
    }
    tokens.iter().any(|t| {
        t.strip_prefix(keyword)
            .is_some_and(|rest| rest.is_empty() || rest == "s" || rest == "es")
    })
}
