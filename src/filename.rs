//! Deterministic filename generation
//!
//! Export filenames are derived entirely from post metadata so that the same
//! post always lands in the same file: the external file writer relies on
//! that for reproducible exports and for deduplication across repeated runs.

use chrono::NaiveDate;

/// Filename used when a title slugifies to nothing
const FALLBACK_SLUG: &str = "untitled";

/// Generate a Markdown export filename from a post title
///
/// The title is reduced to a lowercase ASCII slug (runs of anything other
/// than ASCII letters and digits collapse to a single `-`). With
/// `add_date_prefix` set and a publish date available, the slug is prefixed
/// with `YYYY-MM-DD-`. The `.md` suffix is always appended.
///
/// Deterministic: identical inputs always produce the identical string.
///
/// # Examples
///
/// ```rust
/// use chrono::NaiveDate;
/// use wp_markdown_converter::filename::generate_filename;
///
/// let date = NaiveDate::from_ymd_opt(2024, 1, 5);
/// assert_eq!(
///     generate_filename("Hello, World!", date, true),
///     "2024-01-05-hello-world.md"
/// );
/// assert_eq!(generate_filename("Hello, World!", date, false), "hello-world.md");
/// ```
pub fn generate_filename(
    title: &str,
    publish_date: Option<NaiveDate>,
    add_date_prefix: bool,
) -> String {
    let slug = slugify(title);

    match (add_date_prefix, publish_date) {
        (true, Some(date)) => format!("{}-{}.md", date.format("%Y-%m-%d"), slug),
        _ => format!("{}.md", slug),
    }
}

/// Reduce a title to a lowercase, ASCII-safe slug
///
/// Non-alphanumeric runs (including all non-ASCII characters) collapse to a
/// single `-`; leading and trailing separators are dropped. A title with no
/// usable characters falls back to `"untitled"`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_separator = false;

    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_separator = true;
        }
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("Already-Slugged"), "already-slugged");
        assert_eq!(slugify("  Spaces   Galore  "), "spaces-galore");
    }

    #[test]
    fn test_slugify_collapses_symbol_runs() {
        assert_eq!(slugify("a -- b ?? c"), "a-b-c");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Menü 2024"), "caf-men-2024");
    }

    #[test]
    fn test_slugify_empty_falls_back() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn test_date_prefix() {
        assert_eq!(
            generate_filename("Hello, World!", date(2024, 1, 5), true),
            "2024-01-05-hello-world.md"
        );
    }

    #[test]
    fn test_no_prefix_without_flag() {
        assert_eq!(
            generate_filename("Hello, World!", date(2024, 1, 5), false),
            "hello-world.md"
        );
    }

    #[test]
    fn test_prefix_requested_but_no_date() {
        assert_eq!(generate_filename("Post", None, true), "post.md");
    }

    #[test]
    fn test_deterministic() {
        let first = generate_filename("Hello, World!", date(2024, 1, 5), true);
        let second = generate_filename("Hello, World!", date(2024, 1, 5), true);
        assert_eq!(first, second);
    }

    #[test]
    fn test_zero_padded_date() {
        assert_eq!(
            generate_filename("March post", date(2024, 3, 7), true),
            "2024-03-07-march-post.md"
        );
    }

    proptest! {
        #[test]
        fn prop_filename_deterministic(title in ".{0,80}") {
            let a = generate_filename(&title, date(2024, 6, 1), true);
            let b = generate_filename(&title, date(2024, 6, 1), true);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_slug_is_ascii_safe(title in ".{0,80}") {
            let slug = slugify(&title);
            prop_assert!(!slug.is_empty());
            prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
        }

        #[test]
        fn prop_filename_has_md_suffix(title in ".{0,80}", with_date in prop::bool::ANY) {
            let name = generate_filename(&title, date(2024, 6, 1), with_date);
            prop_assert!(name.ends_with(".md"));
        }
    }
}
