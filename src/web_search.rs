//! Plain-text rendering of aggregated results for a reader or an LLM prompt.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use companion_search::SearchResult;

/// Renders `results` as a Markdown summary capped at `max_bytes`.
///
/// The header names how many distinct engines contributed. Each entry keeps
/// the engine that found it so a caller can cite sources.
pub fn render_summary(query: &str, results: &[SearchResult], max_bytes: usize) -> String {
    if results.is_empty() {
        return format!("No results found for \"{query}\".");
    }

    let sources: BTreeSet<&str> = results.iter().map(|r| r.source.as_str()).collect();
    let mut output = format!(
        "## Summary from {} Search {} for \"{query}\"\n\n",
        sources.len(),
        if sources.len() == 1 { "Engine" } else { "Engines" },
    );
    for (i, result) in results.iter().enumerate() {
        let _ = write!(
            output,
            "{}. **{}** ({})\n   URL: {}\n",
            i + 1,
            result.title,
            result.source,
            result.url,
        );
        if !result.snippet.is_empty() {
            let _ = writeln!(output, "   {}", result.snippet);
        }
        output.push('\n');
    }
    let _ = writeln!(
        output,
        "Sources: {}",
        sources.into_iter().collect::<Vec<_>>().join(", ")
    );

    truncate_output(&output, max_bytes).0
}

/// Truncates `s` to at most `max_bytes` on a char boundary.
///
/// Returns the (possibly annotated) text and whether truncation happened.
pub fn truncate_output(s: &str, max_bytes: usize) -> (String, bool) {
    if s.len() <= max_bytes {
        return (s.to_string(), false);
    }

    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }

    (
        format!("{}\n\n[output truncated at {max_bytes} bytes]", &s[..end]),
        true,
    )
}
