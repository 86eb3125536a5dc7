//! Post metadata and front matter generation
//!
//! The host application reads a post's metadata once per conversion request
//! and hands it over as a fixed-shape record; nothing is cached across
//! requests because content can change between exports. Absence and
//! emptiness are both explicit states, and both cause a field to be omitted
//! from the front matter rather than emitted blank.
//!
//! # Front matter format
//!
//! ```yaml
//! ---
//! title: "Post Title"
//! publish_date: "2024-01-05 09:30:00"
//! author: "Jane Doe"
//! featured_image: "https://cdn.test/hero.jpg"
//! categories: "News, Updates"
//! ---
//! ```
//!
//! Field order is fixed. String values are double-quoted with internal
//! quotes, backslashes, and control characters escaped.

use chrono::NaiveDateTime;

/// Metadata for a single post, read from the external collaborator
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PostMetadata {
    /// Raw post identifier, carried for caller-side logging
    pub id: u64,
    /// Post title
    pub title: String,
    /// Publish timestamp
    pub publish_date: Option<NaiveDateTime>,
    /// Author display name
    pub author: Option<String>,
    /// Featured image URL
    pub featured_image: Option<String>,
    /// Category names, comma-joined in the front matter
    pub categories: Vec<String>,
}

impl PostMetadata {
    /// Create metadata with just a title
    pub fn with_title(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Build the delimited front matter block for a post
///
/// One `key: value` line per non-empty field, in fixed order: title,
/// publish_date, author, featured_image, categories. The block ends with a
/// blank line so the body can be appended directly.
pub fn format_front_matter(meta: &PostMetadata) -> String {
    let mut output = String::from("---\n");

    write_field(&mut output, "title", &meta.title);

    if let Some(date) = meta.publish_date {
        let formatted = date.format("%Y-%m-%d %H:%M:%S").to_string();
        write_field(&mut output, "publish_date", &formatted);
    }

    if let Some(ref author) = meta.author {
        write_field(&mut output, "author", author);
    }

    if let Some(ref image) = meta.featured_image {
        write_field(&mut output, "featured_image", image);
    }

    if !meta.categories.is_empty() {
        let joined = meta.categories.join(", ");
        write_field(&mut output, "categories", &joined);
    }

    output.push_str("---\n\n");
    output
}

/// Write a single `key: "value"` line, skipping empty values
fn write_field(output: &mut String, key: &str, value: &str) {
    if value.trim().is_empty() {
        return;
    }
    output.push_str(key);
    output.push_str(": ");
    write_quoted(output, value);
    output.push('\n');
}

/// Write a double-quoted scalar with internal escaping
fn write_quoted(output: &mut String, value: &str) {
    output.push('"');
    for ch in value.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            _ => output.push(ch),
        }
    }
    output.push('"');
}
