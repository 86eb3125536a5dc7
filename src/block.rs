//! Block segmentation and list nesting
//!
//! The segmenter walks the sanitized DOM body and produces an ordered
//! sequence of [`BlockNode`] values. Recognition priority puts outer
//! container tags first, so a figure inside a gallery or a list inside a
//! list item is consumed by its wrapper rather than being matched on its
//! own: media blocks (figure/gallery wrappers) come before headings,
//! paragraphs, unordered and ordered lists, blockquotes, code blocks, and
//! horizontal rules. Anything the segmenter does not recognize as a block
//! is preserved: unknown containers are descended into, and loose inline
//! content between blocks becomes a [`BlockNode::Passthrough`] that is
//! inline-rendered as-is.
//!
//! List decomposition is recursive. An embedded `ul`/`ol` inside an `li` is
//! nested one level deeper and excluded from the item's own text, so an
//! inner list's items are never flattened into the parent item. The DOM tree
//! already matches each closing tag to the correct opening tag, which is the
//! property a flat per-tag pattern match cannot provide.

use crate::inline::{InlineSpan, parse_inline_children, parse_node, render_spans};
use crate::media::{ImageRef, MediaLookup, resolve_block_image, resolve_gallery};
use crate::parser::{class_contains, element_name, get_attr, raw_text};
use markup5ever_rcdom::{Handle, NodeData};

/// Indent unit for nested list rendering: two spaces per depth level
const LIST_INDENT: &str = "  ";

/// A top-level structural unit of content
#[derive(Debug, Clone, PartialEq)]
pub enum BlockNode {
    /// Heading with level clamped to [1,6]
    Heading { level: u8, content: Vec<InlineSpan> },
    /// Paragraph of inline content
    Paragraph(Vec<InlineSpan>),
    /// Ordered or unordered list
    List(List),
    /// Blockquote holding a sequence of inline-content paragraphs
    Blockquote(Vec<Vec<InlineSpan>>),
    /// Preformatted code, preserved verbatim
    CodeBlock {
        language: Option<String>,
        text: String,
    },
    /// Figure or gallery resolved to image references, in document order
    Media(Vec<ImageRef>),
    /// Thematic break
    HorizontalRule,
    /// Content between blocks that matched no pattern
    Passthrough(Vec<InlineSpan>),
}

/// A list block: ordered flag plus its items
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub items: Vec<ListItem>,
}

/// One list item: inline content plus an optional nested list
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    pub content: Vec<InlineSpan>,
    pub nested: Option<Box<List>>,
}

/// Segment the DOM body into an ordered block sequence
pub fn segment(body: &Handle, lookup: &dyn MediaLookup) -> Vec<BlockNode> {
    let mut blocks = Vec::new();
    let mut pending: Vec<InlineSpan> = Vec::new();
    segment_children(body, lookup, &mut blocks, &mut pending);
    flush_passthrough(&mut blocks, &mut pending);
    blocks
}

fn segment_children(
    node: &Handle,
    lookup: &dyn MediaLookup,
    blocks: &mut Vec<BlockNode>,
    pending: &mut Vec<InlineSpan>,
) {
    for child in node.children.borrow().iter() {
        match child.data {
            NodeData::Element { .. } => {
                segment_element(child, lookup, blocks, pending);
            }
            NodeData::Text { .. } => {
                parse_node(child, lookup, pending);
            }
            _ => {}
        }
    }
}

fn segment_element(
    node: &Handle,
    lookup: &dyn MediaLookup,
    blocks: &mut Vec<BlockNode>,
    pending: &mut Vec<InlineSpan>,
) {
    let name = element_name(node).unwrap_or_default();

    // Media wrappers take priority over everything their contents could
    // otherwise match
    if is_gallery(node) {
        flush_passthrough(blocks, pending);
        let images = resolve_gallery(node, lookup);
        if !images.is_empty() {
            blocks.push(BlockNode::Media(images));
        }
        return;
    }
    if is_figure(node, &name) {
        if let Some(image) = resolve_block_image(node, lookup) {
            flush_passthrough(blocks, pending);
            blocks.push(BlockNode::Media(vec![image]));
            return;
        }
        // A figure without an image is just a container
        flush_passthrough(blocks, pending);
        segment_children(node, lookup, blocks, pending);
        return;
    }

    match name.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            flush_passthrough(blocks, pending);
            let level = heading_level(&name);
            let content = parse_inline_children(node, lookup);
            if !render_spans(&content).is_empty() {
                blocks.push(BlockNode::Heading { level, content });
            }
        }
        "p" => {
            flush_passthrough(blocks, pending);
            let content = parse_inline_children(node, lookup);
            // Empty paragraphs are dropped, not emitted as blank lines
            if !render_spans(&content).is_empty() {
                blocks.push(BlockNode::Paragraph(content));
            }
        }
        "ul" => {
            flush_passthrough(blocks, pending);
            let list = nest(node, false, lookup);
            if !list.items.is_empty() {
                blocks.push(BlockNode::List(list));
            }
        }
        "ol" => {
            flush_passthrough(blocks, pending);
            let list = nest(node, true, lookup);
            if !list.items.is_empty() {
                blocks.push(BlockNode::List(list));
            }
        }
        "blockquote" => {
            flush_passthrough(blocks, pending);
            let paragraphs = blockquote_paragraphs(node, lookup);
            if !paragraphs.is_empty() {
                blocks.push(BlockNode::Blockquote(paragraphs));
            }
        }
        "pre" => {
            flush_passthrough(blocks, pending);
            let (language, text) = code_block_content(node);
            if !text.trim().is_empty() {
                blocks.push(BlockNode::CodeBlock { language, text });
            }
        }
        "hr" => {
            flush_passthrough(blocks, pending);
            blocks.push(BlockNode::HorizontalRule);
        }
        // Generic containers are descended into; their children segment
        // at the same level
        "div" | "section" | "article" | "main" | "aside" | "header" | "footer" | "nav" => {
            flush_passthrough(blocks, pending);
            segment_children(node, lookup, blocks, pending);
        }
        // Everything else is inline content riding between blocks
        _ => {
            parse_node(node, lookup, pending);
        }
    }
}

fn flush_passthrough(blocks: &mut Vec<BlockNode>, pending: &mut Vec<InlineSpan>) {
    if pending.is_empty() {
        return;
    }
    let spans = std::mem::take(pending);
    if !render_spans(&spans).is_empty() {
        blocks.push(BlockNode::Passthrough(spans));
    }
}

/// Heading level from the tag name digit, clamped to [1,6]
fn heading_level(name: &str) -> u8 {
    name[1..].parse::<u8>().unwrap_or(1).clamp(1, 6)
}

/// Gallery wrappers: `wp-block-gallery` figures, `gallery`/`gallery-columns-N`
/// shortcode divs, `tiled-gallery` containers
fn is_gallery(node: &Handle) -> bool {
    class_contains(node, "gallery")
}

/// Single-image wrappers: `<figure>` or a classic `<div class="wp-caption">`
fn is_figure(node: &Handle, name: &str) -> bool {
    name == "figure" || class_contains(node, "wp-caption")
}

/// Recursively decompose a list element into an item tree
///
/// For each `li`, nested `ul`/`ol` children are recursed one level deeper and
/// excluded from the item's own inline content. Items with neither text nor a
/// nested list are skipped. Multiple sibling nested lists under one item (a
/// shape the source grammar does not produce, but malformed markup can) are
/// merged into the first list's item sequence.
pub fn nest(list_node: &Handle, ordered: bool, lookup: &dyn MediaLookup) -> List {
    let mut items = Vec::new();

    for child in list_node.children.borrow().iter() {
        if element_name(child).as_deref() != Some("li") {
            continue;
        }

        let mut content: Vec<InlineSpan> = Vec::new();
        let mut nested: Option<List> = None;

        for item_child in child.children.borrow().iter() {
            match element_name(item_child).as_deref() {
                Some("ul") => {
                    merge_nested(&mut nested, nest(item_child, false, lookup));
                }
                Some("ol") => {
                    merge_nested(&mut nested, nest(item_child, true, lookup));
                }
                _ => parse_node(item_child, lookup, &mut content),
            }
        }

        let has_text = !render_spans(&content).is_empty();
        let has_children = nested.as_ref().is_some_and(|l| !l.items.is_empty());
        if has_text || has_children {
            items.push(ListItem {
                content,
                nested: nested.filter(|l| !l.items.is_empty()).map(Box::new),
            });
        }
    }

    List { ordered, items }
}

fn merge_nested(slot: &mut Option<List>, found: List) {
    match slot {
        None => *slot = Some(found),
        Some(existing) => existing.items.extend(found.items),
    }
}

/// Collect a blockquote's content as a sequence of inline paragraphs
fn blockquote_paragraphs(node: &Handle, lookup: &dyn MediaLookup) -> Vec<Vec<InlineSpan>> {
    let mut paragraphs = Vec::new();
    let mut loose: Vec<InlineSpan> = Vec::new();

    for child in node.children.borrow().iter() {
        if element_name(child).as_deref() == Some("p") {
            if !render_spans(&loose).is_empty() {
                paragraphs.push(std::mem::take(&mut loose));
            } else {
                loose.clear();
            }
            let content = parse_inline_children(child, lookup);
            if !render_spans(&content).is_empty() {
                paragraphs.push(content);
            }
        } else {
            parse_node(child, lookup, &mut loose);
        }
    }

    if !render_spans(&loose).is_empty() {
        paragraphs.push(loose);
    }

    paragraphs
}

/// Extract a code block's language hint and verbatim text
///
/// The language comes from a `language-`/`lang-` class prefix on the inner
/// `code` element. Text is taken exactly as-is, never normalized.
fn code_block_content(node: &Handle) -> (Option<String>, String) {
    let mut language = None;

    for child in node.children.borrow().iter() {
        if element_name(child).as_deref() == Some("code")
            && let Some(classes) = get_attr(child, "class")
        {
            for class in classes.split_whitespace() {
                if let Some(lang) = class.strip_prefix("language-") {
                    language = Some(lang.to_string());
                    break;
                } else if let Some(lang) = class.strip_prefix("lang-") {
                    language = Some(lang.to_string());
                    break;
                }
            }
        }
    }

    let mut text = String::new();
    raw_text(node, &mut text);
    (language, text)
}

impl BlockNode {
    /// Render this block to Markdown, without surrounding blank lines
    ///
    /// Blank-line spacing between blocks belongs to the assembler.
    pub fn render(&self) -> String {
        match self {
            BlockNode::Heading { level, content } => {
                let text = single_line(&render_spans(content));
                let mut out = String::new();
                for _ in 0..*level {
                    out.push('#');
                }
                out.push(' ');
                out.push_str(&text);
                out
            }
            BlockNode::Paragraph(content) => render_spans(content),
            BlockNode::List(list) => render_list(list, 0),
            BlockNode::Blockquote(paragraphs) => {
                let mut lines = Vec::new();
                for paragraph in paragraphs {
                    for line in render_spans(paragraph).lines() {
                        let trimmed = line.trim();
                        if !trimmed.is_empty() {
                            lines.push(format!("> {}", trimmed));
                        }
                    }
                }
                lines.join("\n")
            }
            BlockNode::CodeBlock { language, text } => {
                let mut out = String::from("```");
                if let Some(lang) = language {
                    out.push_str(lang);
                }
                out.push('\n');
                out.push_str(text.trim_matches('\n'));
                out.push_str("\n```");
                out
            }
            BlockNode::Media(images) => {
                let rendered: Vec<String> = images.iter().map(ImageRef::to_markdown).collect();
                rendered.join("\n\n")
            }
            BlockNode::HorizontalRule => "---".to_string(),
            BlockNode::Passthrough(content) => render_spans(content),
        }
    }
}

/// Render a list at the given depth
///
/// Each item renders as `<indent><marker> <text>` with a two-space indent
/// unit per depth level. Unordered items use `*`; ordered items count `1.`
/// upward per sibling list, independent of any numbering attributes in the
/// source. A nested list's lines follow its parent item, one level deeper.
fn render_list(list: &List, depth: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let indent = LIST_INDENT.repeat(depth);
    let mut counter = 0usize;

    for item in &list.items {
        let text = single_line(&render_spans(&item.content));

        if !text.is_empty() {
            counter += 1;
            let marker = if list.ordered {
                format!("{}.", counter)
            } else {
                "*".to_string()
            };
            lines.push(format!("{}{} {}", indent, marker, text));
        }

        if let Some(nested) = &item.nested {
            let rendered = render_list(nested, depth + 1);
            if !rendered.is_empty() {
                lines.push(rendered);
            }
        }
    }

    lines.join("\n")
}

/// Collapse a rendered fragment onto one line
fn single_line(text: &str) -> String {
    let parts: Vec<&str> = text.split_whitespace().collect();
    parts.join(" ")
}
