//! Utility functions for text cleanup and log formatting.
//!
//! This module provides helper functions used throughout the application:
//! - Whitespace normalization of scraped text
//! - HTML escaping for Telegram's `HTML` parse mode
//! - String truncation for logging long response bodies

use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Collapse every run of whitespace to a single space and trim the ends.
///
/// Scraped card text is spread over several text nodes with indentation and
/// newlines in between; this turns it into the single line a reader sees.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_text("\n   Product\n   Manager  "), "Product Manager");
/// ```
pub fn normalize_text(s: &str) -> String {
    WHITESPACE.replace_all(s.trim(), " ").into_owned()
}

/// Escape the three characters Telegram's `HTML` parse mode treats as markup.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(escape_html("R&D <Lab>"), "R&amp;D &lt;Lab&gt;");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to at most `max` bytes (backing off to the
/// nearest character boundary) with an ellipsis and byte count appended.
///
/// # Returns
///
/// The original string if it fits, otherwise a truncated version with
/// `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("  Product Manager  "), "Product Manager");
        assert_eq!(normalize_text("\n    Product\n\t  Manager\n"), "Product Manager");
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text(" \n\t "), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Procter & Gamble"), "Procter &amp; Gamble");
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_truncate_for_log_short_string() {
        assert_eq!(truncate_for_log("Hello, world!", 100), "Hello, world!");
    }

    #[test]
    fn test_truncate_for_log_long_string() {
        let s = "a".repeat(500);
        let result = truncate_for_log(&s, 100);
        assert!(result.starts_with(&"a".repeat(100)));
        assert!(result.contains("…(+400 bytes)"));
    }

    #[test]
    fn test_truncate_for_log_respects_char_boundary() {
        // 'é' is two bytes; cutting at 3 would split the second one.
        let result = truncate_for_log("éééé", 3);
        assert!(result.starts_with('é'));
        assert!(result.contains("…(+6 bytes)"));
    }
}
