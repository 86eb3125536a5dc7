//! Pre-parse removal of non-content markup
//!
//! Post content arriving from the database may carry markup that has no
//! Markdown counterpart and must never leak into the output: HTML comments,
//! embedded frames, scripts, and style blocks. They are stripped from the raw
//! string before structural parsing begins, so the segmenter only ever sees
//! content-bearing markup.
//!
//! Each removal operates on an independent tag name; absence of a matching
//! tag is a no-op. The input string is never mutated in place — a new string
//! is produced.
//!
//! # Examples
//!
//! ```rust
//! use wp_markdown_converter::sanitizer::sanitize;
//!
//! let raw = "<p>Keep</p><!-- note --><script>drop();</script>";
//! let clean = sanitize(raw);
//! assert_eq!(clean, "<p>Keep</p>");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Remove non-content markup from a raw content string
///
/// Strips, in order: HTML comments, `<iframe>` blocks, `<script>` blocks,
/// `<style>` blocks. Matching is case-insensitive and spans newlines.
///
/// # Arguments
///
/// * `raw` - The raw post content string
///
/// # Returns
///
/// A new string with non-content markup removed. If a pattern fails to
/// compile (which cannot happen with the fixed patterns below, but is
/// handled rather than unwrapped), that strip is skipped and the input
/// passes through unchanged.
pub fn sanitize(raw: &str) -> String {
    let mut content = strip_pattern(raw, comment_pattern());
    content = strip_pattern(&content, iframe_pattern());
    content = strip_pattern(&content, script_pattern());
    content = strip_pattern(&content, style_pattern());
    content
}

fn strip_pattern(input: &str, pattern: Option<&Regex>) -> String {
    match pattern {
        Some(re) => re.replace_all(input, "").into_owned(),
        None => input.to_string(),
    }
}

fn comment_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").ok()).as_ref()
}

fn iframe_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<iframe[^>]*>.*?</iframe>").ok())
        .as_ref()
}

fn script_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script[^>]*>.*?</script>").ok())
        .as_ref()
}

fn style_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<style[^>]*>.*?</style>").ok())
        .as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_comments() {
        let raw = "<p>Before</p><!-- hidden note --><p>After</p>";
        let result = sanitize(raw);
        assert_eq!(result, "<p>Before</p><p>After</p>");
    }

    #[test]
    fn test_removes_multiline_comment() {
        let raw = "<p>Text</p><!--\nline one\nline two\n-->";
        let result = sanitize(raw);
        assert_eq!(result, "<p>Text</p>");
    }

    #[test]
    fn test_removes_script_blocks() {
        let raw = "<p>Content</p><script type=\"text/javascript\">alert('x');</script>";
        let result = sanitize(raw);
        assert!(!result.contains("alert"));
        assert!(!result.contains("script"));
        assert!(result.contains("Content"));
    }

    #[test]
    fn test_removes_style_blocks() {
        let raw = "<style>body { color: red; }</style><p>Visible</p>";
        let result = sanitize(raw);
        assert!(!result.contains("color"));
        assert_eq!(result, "<p>Visible</p>");
    }

    #[test]
    fn test_removes_iframes() {
        let raw = "<p>Intro</p><iframe src=\"https://player.test/embed\"></iframe>";
        let result = sanitize(raw);
        assert!(!result.contains("iframe"));
        assert!(!result.contains("player.test"));
    }

    #[test]
    fn test_case_insensitive_tags() {
        let raw = "<SCRIPT>code();</SCRIPT><STYLE>.x{}</STYLE>";
        let result = sanitize(raw);
        assert_eq!(result, "");
    }

    #[test]
    fn test_no_matching_tags_is_noop() {
        let raw = "<p>Plain content with <strong>markup</strong>.</p>";
        assert_eq!(sanitize(raw), raw);
    }

    #[test]
    fn test_multiple_blocks_removed_independently() {
        let raw = "<script>a();</script><p>Keep</p><script>b();</script>";
        let result = sanitize(raw);
        assert_eq!(result, "<p>Keep</p>");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(sanitize(""), "");
    }
}
