//! Line commands understood by the `interactive` session.
//!
//! Plain lines are queries. Lines starting with `:` manage the shared cache.

use std::fmt::Write as _;

use companion_search::CacheStats;

/// Help text listing the session commands.
pub const HELP: &str = "\
Type a query to search. Commands:
  :refresh <text>  drop cached answers whose query contains <text>
  :sweep           drop every expired cached answer now
  :stats           show cache occupancy and hit rate
  :help            show this help
  :quit            leave (an empty line also quits)";

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand<'a> {
    /// Run a search for this query.
    Search(&'a str),
    /// Force-refresh: evict cached answers matching this text.
    Refresh(&'a str),
    /// Evict expired entries immediately.
    Sweep,
    /// Print cache statistics.
    Stats,
    /// Print [`HELP`].
    Help,
    /// End the session.
    Quit,
    /// A `:` command that was not understood, or lacked its argument.
    Invalid(&'a str),
}

/// Parse one line of session input.
pub fn parse_line(line: &str) -> SessionCommand<'_> {
    let line = line.trim();
    if line.is_empty() {
        return SessionCommand::Quit;
    }
    let Some(command) = line.strip_prefix(':') else {
        return SessionCommand::Search(line);
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match (name, arg) {
        ("refresh", "") => SessionCommand::Invalid(line),
        ("refresh", pattern) => SessionCommand::Refresh(pattern),
        ("sweep", "") => SessionCommand::Sweep,
        ("stats", "") => SessionCommand::Stats,
        ("help", "") => SessionCommand::Help,
        ("quit" | "q", "") => SessionCommand::Quit,
        _ => SessionCommand::Invalid(line),
    }
}

/// One-paragraph rendering of cache statistics.
pub fn render_stats(stats: &CacheStats) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "cache: {} entries ({} fresh, {} expired)",
        stats.entries, stats.fresh, stats.expired
    );
    let _ = write!(
        out,
        "lookups: {} hits, {} misses, hit rate {:.1}%",
        stats.hits,
        stats.misses,
        stats.hit_rate * 100.0
    );
    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn plain_lines_are_queries() {
        assert_eq!(
            parse_line("  gold price today "),
            SessionCommand::Search("gold price today")
        );
    }

    #[test]
    fn empty_line_quits() {
        assert_eq!(parse_line("   "), SessionCommand::Quit);
        assert_eq!(parse_line(":quit"), SessionCommand::Quit);
    }

    #[test]
    fn refresh_takes_the_rest_of_the_line() {
        assert_eq!(
            parse_line(":refresh  iPhone 15 price "),
            SessionCommand::Refresh("iPhone 15 price")
        );
    }

    #[test]
    fn refresh_without_pattern_is_invalid() {
        assert_eq!(parse_line(":refresh"), SessionCommand::Invalid(":refresh"));
        assert_eq!(parse_line(":refresh   "), SessionCommand::Invalid(":refresh"));
    }

    #[test]
    fn bare_commands_parse() {
        assert_eq!(parse_line(":stats"), SessionCommand::Stats);
        assert_eq!(parse_line(":sweep"), SessionCommand::Sweep);
        assert_eq!(parse_line(":help"), SessionCommand::Help);
    }

    #[test]
    fn unknown_or_overloaded_commands_are_invalid() {
        assert_eq!(parse_line(":reboot"), SessionCommand::Invalid(":reboot"));
        assert_eq!(parse_line(":stats now"), SessionCommand::Invalid(":stats now"));
    }

    #[test]
    fn stats_render_hit_rate_as_percentage() {
        let stats = CacheStats {
            entries: 3,
            fresh: 2,
            expired: 1,
            hits: 1,
            misses: 3,
            hit_rate: 0.25,
        };
        let out = render_stats(&stats);
        assert!(out.contains("3 entries (2 fresh, 1 expired)"));
        assert!(out.contains("hit rate 25.0%"));
    }
}
