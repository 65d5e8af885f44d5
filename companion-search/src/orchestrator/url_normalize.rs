//! URL normalisation for cross-engine deduplication.
//!
//! Two results point at the same page when their host and path agree,
//! ignoring case, scheme, default ports, query string, fragment and a
//! trailing slash. Engines append their own tracking and session parameters,
//! so the query string carries no identity here.

use url::Url;

/// Normalise a URL into its deduplication key: `host[:port]/path`, lowercased.
///
/// 1. Drop the scheme, query string and fragment.
/// 2. Drop default ports (`:80` for HTTP, `:443` for HTTPS).
/// 3. Lowercase host and path.
/// 4. Trim trailing slashes from the path (`/` alone becomes empty).
///
/// Unparsable input is trimmed, lowercased and stripped of anything after
/// `?` or `#`, so garbage still dedups against identical garbage.
///
/// # Examples
///
/// ```
/// use companion_search::orchestrator::url_normalize::normalize_url;
///
/// let a = normalize_url("https://Example.COM/Path/?utm_source=x#top");
/// let b = normalize_url("http://example.com/path");
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(parsed) = Url::parse(trimmed) else {
        return fallback_key(trimmed);
    };
    let Some(host) = parsed.host_str() else {
        return fallback_key(trimmed);
    };

    let mut key = host.to_lowercase();
    if let Some(port) = parsed.port() {
        if !is_default_port(parsed.scheme(), port) {
            key.push(':');
            key.push_str(&port.to_string());
        }
    }
    key.push_str(parsed.path().trim_end_matches('/'));
    key.to_lowercase()
}

fn fallback_key(raw: &str) -> String {
    let end = raw.find(|c: char| c == '?' || c == '#').unwrap_or(raw.len());
    raw[..end].trim_end_matches('/').to_lowercase()
}

/// Returns `true` if `port` is the default for `scheme`.
fn is_default_port(scheme: &str, port: u16) -> bool {
    matches!((scheme, port), ("http", 80) | ("https", 443))
}
