//! HTML5 parsing using html5ever
//!
//! Post content is parsed with Mozilla's html5ever, which implements the
//! WHATWG HTML5 parsing algorithm. Malformed markup is handled by the HTML5
//! recovery rules rather than by erroring out: an unterminated tag yields a
//! tree covering the rest of the document, which downstream stages render as
//! best-effort output. Nested same-named containers (a list inside a list
//! item, a figure inside a gallery) are matched to the correct closing tag by
//! the tree builder, which is exactly what flat pattern matching cannot do.
//!
//! Content strings are always UTF-8 (`&str`), so no charset detection or
//! transcoding happens here.
//!
//! # Examples
//!
//! ```rust
//! use wp_markdown_converter::parser::{parse_html, find_body};
//!
//! let dom = parse_html("<h1>Hello</h1>");
//! assert!(find_body(&dom).is_some());
//!
//! // Malformed markup still produces a tree
//! let dom = parse_html("<ul><li>unclosed");
//! assert!(find_body(&dom).is_some());
//! ```

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse an HTML content string into a DOM tree
///
/// Fragments without `<html>`/`<body>` wrappers (the normal shape of post
/// content) are wrapped by the tree builder automatically. Parsing never
/// fails; error recovery follows the HTML5 specification.
pub fn parse_html(html: &str) -> RcDom {
    parse_document(RcDom::default(), Default::default()).one(html)
}

/// Locate the `<body>` element of a parsed document
///
/// The tree builder always synthesizes `html` and `body` elements, so this
/// returns `None` only for a tree that did not come from `parse_html`.
pub fn find_body(dom: &RcDom) -> Option<Handle> {
    find_element(&dom.document, "body")
}

fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { ref name, .. } = node.data
        && name.local.as_ref() == tag
    {
        return Some(node.clone());
    }
    for child in node.children.borrow().iter() {
        if let Some(found) = find_element(child, tag) {
            return Some(found);
        }
    }
    None
}

/// Get the tag name of an element node, or `None` for non-elements
pub fn element_name(node: &Handle) -> Option<String> {
    if let NodeData::Element { ref name, .. } = node.data {
        Some(name.local.as_ref().to_string())
    } else {
        None
    }
}

/// Get an attribute value from an element node
pub fn get_attr(node: &Handle, attr_name: &str) -> Option<String> {
    if let NodeData::Element { ref attrs, .. } = node.data {
        attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == attr_name)
            .map(|attr| attr.value.to_string())
    } else {
        None
    }
}

/// Check whether an element carries a class token containing `needle`
pub fn class_contains(node: &Handle, needle: &str) -> bool {
    get_attr(node, "class")
        .map(|classes| classes.split_whitespace().any(|c| c.contains(needle)))
        .unwrap_or(false)
}

/// Extract all descendant text, preserving it exactly as-is
///
/// Used for code blocks, where whitespace and line breaks are significant
/// and must never be normalized.
pub fn raw_text(node: &Handle, output: &mut String) {
    match node.data {
        NodeData::Text { ref contents } => {
            output.push_str(&contents.borrow());
        }
        NodeData::Element { .. } | NodeData::Document => {
            for child in node.children.borrow().iter() {
                raw_text(child, output);
            }
        }
        _ => {}
    }
}

/// Extract descendant text with whitespace collapsed to single spaces
pub fn text_content(node: &Handle) -> String {
    let mut buffer = String::new();
    raw_text(node, &mut buffer);
    normalize_whitespace(&buffer)
}

/// Collapse consecutive whitespace to single spaces and trim
pub fn normalize_whitespace(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_fragment() {
        let dom = parse_html("<p>Hello</p>");
        let body = find_body(&dom).expect("body should exist");
        assert!(!body.children.borrow().is_empty());
    }

    #[test]
    fn test_parse_malformed_html() {
        let dom = parse_html("<ul><li>unterminated");
        assert!(find_body(&dom).is_some());
    }

    #[test]
    fn test_parse_whitespace_only() {
        let dom = parse_html("   \n\t  ");
        assert!(find_body(&dom).is_some());
    }

    #[test]
    fn test_get_attr() {
        let dom = parse_html("<a href=\"https://x.test\" title=\"t\">Click</a>");
        let body = find_body(&dom).unwrap();
        let anchor = find_element(&body, "a").unwrap();
        assert_eq!(get_attr(&anchor, "href").as_deref(), Some("https://x.test"));
        assert_eq!(get_attr(&anchor, "title").as_deref(), Some("t"));
        assert_eq!(get_attr(&anchor, "rel"), None);
    }

    #[test]
    fn test_class_contains() {
        let dom = parse_html("<img class=\"alignnone wp-image-42 size-full\" src=\"a.jpg\">");
        let body = find_body(&dom).unwrap();
        let img = find_element(&body, "img").unwrap();
        assert!(class_contains(&img, "wp-image-"));
        assert!(!class_contains(&img, "gallery"));
    }

    #[test]
    fn test_text_content_normalizes_whitespace() {
        let dom = parse_html("<p>Text   with\n   gaps</p>");
        let body = find_body(&dom).unwrap();
        assert_eq!(text_content(&body), "Text with gaps");
    }

    #[test]
    fn test_raw_text_preserves_whitespace() {
        let dom = parse_html("<pre>line one\n    indented</pre>");
        let body = find_body(&dom).unwrap();
        let pre = find_element(&body, "pre").unwrap();
        let mut out = String::new();
        raw_text(&pre, &mut out);
        assert_eq!(out, "line one\n    indented");
    }

    #[test]
    fn test_entities_decoded_by_parser() {
        let dom = parse_html("<p>&lt;tag&gt; &amp; &quot;quotes&quot;</p>");
        let body = find_body(&dom).unwrap();
        assert_eq!(text_content(&body), "<tag> & \"quotes\"");
    }
}
