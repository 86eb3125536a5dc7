//! Inline span parsing and rendering
//!
//! Block-level content (a heading's text, a paragraph, a list item) is built
//! into a tree of [`InlineSpan`] values before any Markdown is emitted. The
//! tree is immutable once built and rendered exactly once, so transformed
//! output can never be re-matched and corrupted by a later pass — the failure
//! mode of find-and-replace pipelines.
//!
//! Precedence is fixed by construction: links and images resolve from their
//! elements, inline code captures raw text before emphasis is considered (so
//! `*` inside code stays literal), then italic (`em`/`i`) and bold
//! (`strong`/`b`) wrap their children. An `<hr>` occurring in inline position
//! renders as a rule on its own line.
//!
//! Link and image rendering strips inner markup from the visible text/alt but
//! preserves the href/src verbatim; no URL re-encoding happens here.

use crate::media::{ImageRef, MediaLookup, image_from_node};
use crate::parser::{element_name, get_attr, normalize_whitespace, raw_text};
use markup5ever_rcdom::{Handle, NodeData};

/// A unit of character-level formatting inside a block
#[derive(Debug, Clone, PartialEq)]
pub enum InlineSpan {
    /// Plain text, whitespace not yet normalized
    Text(String),
    /// Bold (`strong`/`b`)
    Bold(Vec<InlineSpan>),
    /// Italic (`em`/`i`)
    Italic(Vec<InlineSpan>),
    /// Inline code; raw text, emphasis inside is never reinterpreted
    Code(String),
    /// Hyperlink; children hold the visible content
    Link { url: String, children: Vec<InlineSpan> },
    /// Inline image
    Image(ImageRef),
    /// Horizontal rule in inline position
    Rule,
}

/// Parse the children of a block element into inline spans
pub fn parse_inline_children(node: &Handle, lookup: &dyn MediaLookup) -> Vec<InlineSpan> {
    let mut spans = Vec::new();
    for child in node.children.borrow().iter() {
        parse_node(child, lookup, &mut spans);
    }
    spans
}

/// Parse a single DOM node into inline spans, appending to `spans`
pub fn parse_node(node: &Handle, lookup: &dyn MediaLookup, spans: &mut Vec<InlineSpan>) {
    match node.data {
        NodeData::Text { ref contents } => {
            spans.push(InlineSpan::Text(contents.borrow().to_string()));
        }
        NodeData::Element { .. } => {
            let name = element_name(node).unwrap_or_default();
            match name.as_str() {
                "a" => {
                    let children = parse_inline_children(node, lookup);
                    match get_attr(node, "href") {
                        Some(url) if !url.is_empty() => {
                            spans.push(InlineSpan::Link { url, children });
                        }
                        // Anchor without a target renders as its content
                        _ => spans.extend(children),
                    }
                }
                "img" => {
                    if let Some(image) = image_from_node(node, lookup) {
                        spans.push(InlineSpan::Image(image));
                    }
                }
                "code" => {
                    let mut code = String::new();
                    raw_text(node, &mut code);
                    spans.push(InlineSpan::Code(code));
                }
                "em" | "i" => {
                    spans.push(InlineSpan::Italic(parse_inline_children(node, lookup)));
                }
                "strong" | "b" => {
                    spans.push(InlineSpan::Bold(parse_inline_children(node, lookup)));
                }
                "br" => {
                    spans.push(InlineSpan::Text("\n".to_string()));
                }
                "hr" => {
                    spans.push(InlineSpan::Rule);
                }
                // Unknown inline wrappers (span, small, sub, ...) contribute
                // their children without formatting
                _ => {
                    for child in node.children.borrow().iter() {
                        parse_node(child, lookup, spans);
                    }
                }
            }
        }
        _ => {}
    }
}

/// Render spans to Markdown text
///
/// Whitespace inside text spans is collapsed; a single space is kept at span
/// boundaries where the source had one, so `foo <b>bar</b>` keeps its gap.
pub fn render_spans(spans: &[InlineSpan]) -> String {
    let mut output = String::new();
    for span in spans {
        render_span(span, &mut output);
    }
    output.trim().to_string()
}

fn render_span(span: &InlineSpan, output: &mut String) {
    match span {
        InlineSpan::Text(text) => {
            let normalized = normalize_whitespace(text);
            if normalized.is_empty() {
                // Whitespace-only text still separates neighboring spans
                if !text.is_empty() {
                    push_boundary_space(output);
                }
                return;
            }
            if starts_with_whitespace(text) {
                push_boundary_space(output);
            }
            output.push_str(&normalized);
            if ends_with_whitespace(text) {
                output.push(' ');
            }
        }
        InlineSpan::Bold(children) => {
            let inner = render_spans(children);
            if !inner.is_empty() {
                output.push_str("**");
                output.push_str(&inner);
                output.push_str("**");
            }
        }
        InlineSpan::Italic(children) => {
            let inner = render_spans(children);
            if !inner.is_empty() {
                output.push('*');
                output.push_str(&inner);
                output.push('*');
            }
        }
        InlineSpan::Code(code) => {
            output.push('`');
            output.push_str(code.trim());
            output.push('`');
        }
        InlineSpan::Link { url, children } => {
            let text = plain_text(children);
            if text.is_empty() {
                // A link with no visible text renders as a bare URL link
                output.push('[');
                output.push_str(url);
                output.push_str("](");
                output.push_str(url);
                output.push(')');
            } else {
                output.push('[');
                output.push_str(&text);
                output.push_str("](");
                output.push_str(url);
                output.push(')');
            }
        }
        InlineSpan::Image(image) => {
            output.push_str(&image.to_markdown());
        }
        InlineSpan::Rule => {
            if !output.is_empty() && !output.ends_with('\n') {
                output.push('\n');
            }
            output.push_str("---\n");
        }
    }
}

fn push_boundary_space(output: &mut String) {
    if !output.is_empty() && !output.ends_with(' ') && !output.ends_with('\n') {
        output.push(' ');
    }
}

fn starts_with_whitespace(text: &str) -> bool {
    text.starts_with(|c: char| c.is_whitespace())
}

fn ends_with_whitespace(text: &str) -> bool {
    text.ends_with(|c: char| c.is_whitespace())
}

/// Flatten spans to their visible text, with all markup stripped
///
/// Used for link text and anywhere Markdown delimiters must not nest.
pub fn plain_text(spans: &[InlineSpan]) -> String {
    let mut buffer = String::new();
    collect_plain_text(spans, &mut buffer);
    normalize_whitespace(&buffer)
}

fn collect_plain_text(spans: &[InlineSpan], buffer: &mut String) {
    for span in spans {
        match span {
            InlineSpan::Text(text) => buffer.push_str(text),
            InlineSpan::Bold(children)
            | InlineSpan::Italic(children)
            | InlineSpan::Link { children, .. } => collect_plain_text(children, buffer),
            InlineSpan::Code(code) => buffer.push_str(code),
            InlineSpan::Image(image) => buffer.push_str(&image.alt),
            InlineSpan::Rule => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::NoMediaLookup;
    use crate::parser::{find_body, parse_html};

    fn render(html: &str) -> String {
        let dom = parse_html(html);
        let body = find_body(&dom).unwrap();
        let spans = parse_inline_children(&body, &NoMediaLookup);
        render_spans(&spans)
    }

    #[test]
    fn test_link() {
        assert_eq!(
            render("<a href=\"https://x.test\">Click</a>"),
            "[Click](https://x.test)"
        );
    }

    #[test]
    fn test_link_strips_inner_markup() {
        assert_eq!(
            render("<a href=\"https://x.test\"><strong>Bold</strong> link</a>"),
            "[Bold link](https://x.test)"
        );
    }

    #[test]
    fn test_link_without_href_renders_text() {
        assert_eq!(render("<a name=\"anchor\">Just text</a>"), "Just text");
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(render("<strong>bold</strong>"), "**bold**");
        assert_eq!(render("<b>bold</b>"), "**bold**");
        assert_eq!(render("<em>italic</em>"), "*italic*");
        assert_eq!(render("<i>italic</i>"), "*italic*");
    }

    #[test]
    fn test_nested_emphasis() {
        assert_eq!(
            render("<strong><em>both</em></strong>"),
            "***both***"
        );
    }

    #[test]
    fn test_inline_code_preserves_emphasis_markers() {
        assert_eq!(render("<code>a * b * c</code>"), "`a * b * c`");
        assert_eq!(render("<code>use &lt;T&gt;</code>"), "`use <T>`");
    }

    #[test]
    fn test_emphasis_inside_code_not_reinterpreted() {
        assert_eq!(render("<code>**not bold**</code>"), "`**not bold**`");
    }

    #[test]
    fn test_image_with_default_alt() {
        assert_eq!(render("<img src=\"pic.jpg\">"), "![Image](pic.jpg)");
    }

    #[test]
    fn test_space_preserved_between_spans() {
        assert_eq!(
            render("plain <strong>bold</strong> tail"),
            "plain **bold** tail"
        );
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(render("one   two\n\tthree"), "one two three");
    }

    #[test]
    fn test_empty_emphasis_dropped() {
        assert_eq!(render("<strong></strong>text"), "text");
    }

    #[test]
    fn test_space_between_adjacent_emphasis_spans() {
        assert_eq!(render("<b>x</b> <b>y</b>"), "**x** **y**");
    }

    #[test]
    fn test_unknown_wrapper_flattened() {
        assert_eq!(render("<span>wrapped <b>deep</b></span>"), "wrapped **deep**");
    }

    #[test]
    fn test_plain_text_flattening() {
        let spans = vec![
            InlineSpan::Text("a ".to_string()),
            InlineSpan::Bold(vec![InlineSpan::Text("b".to_string())]),
            InlineSpan::Code("c".to_string()),
        ];
        assert_eq!(plain_text(&spans), "a b c");
    }

    #[test]
    fn test_inline_rule() {
        let out = render("before<hr>after");
        assert!(out.contains("---"));
        assert!(out.contains("before"));
        assert!(out.contains("after"));
    }
}
