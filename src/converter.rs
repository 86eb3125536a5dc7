//! Markdown converter - transforms post content to Markdown
//!
//! This module ties the pipeline together: sanitize the raw content string,
//! parse it into a DOM tree, segment the tree into blocks, render each block,
//! and assemble the result. The pipeline is one-directional — parse once into
//! an immutable node tree, render once from the tree — so rendered output can
//! never be re-matched by a later transform, the self-collision failure mode
//! of repeated find-and-replace passes.
//!
//! Each conversion is a pure, synchronous function of its input: no I/O, no
//! state across invocations, no locking. Bulk exports may run conversions
//! concurrently or sequentially with no shared mutable state inside the
//! engine.
//!
//! # Examples
//!
//! ```rust
//! use wp_markdown_converter::converter::MarkdownConverter;
//!
//! let converter = MarkdownConverter::new();
//! let markdown = converter.convert("<h1>Title</h1><p>Body text.</p>");
//! assert_eq!(markdown, "# Title\n\nBody text.");
//! ```

use crate::assembler::assemble;
use crate::block::{BlockNode, List, segment};
use crate::error::ConversionError;
use crate::filename::generate_filename;
use crate::inline::InlineSpan;
use crate::media::{ImageRef, MediaLookup, NoMediaLookup};
use crate::metadata::{PostMetadata, format_front_matter};
use crate::parser::{find_body, parse_html};
use crate::sanitizer::sanitize;

/// Conversion options
#[derive(Debug, Clone)]
pub struct ConversionOptions {
    /// Prefix the Markdown body with a front matter block
    pub include_front_matter: bool,
    /// Prefix filenames with the publish date (`YYYY-MM-DD-`)
    pub add_date_prefix: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            include_front_matter: true,
            add_date_prefix: false,
        }
    }
}

/// A finished conversion: the Markdown document plus its filename
///
/// The caller persists both; the engine performs no I/O. `warnings` carries
/// the soft problems encountered along the way (currently images with no
/// resolvable source, which render alt-only with an empty URL) so the caller
/// can log them per post without the conversion having aborted.
#[derive(Debug, Clone, PartialEq)]
pub struct PostExport {
    pub markdown: String,
    pub filename: String,
    pub warnings: Vec<ConversionError>,
}

/// Main converter for post content
///
/// Holds the conversion options and the injected media lookup. The converter
/// itself is stateless across calls and may be shared freely.
pub struct MarkdownConverter {
    options: ConversionOptions,
    media: Box<dyn MediaLookup>,
}

impl MarkdownConverter {
    /// Create a converter with default options and no media lookup
    ///
    /// Without a lookup, image sources resolve by URL-pattern stripping
    /// alone.
    pub fn new() -> Self {
        Self {
            options: ConversionOptions::default(),
            media: Box::new(NoMediaLookup),
        }
    }

    /// Create a converter with custom options
    pub fn with_options(options: ConversionOptions) -> Self {
        Self {
            options,
            media: Box::new(NoMediaLookup),
        }
    }

    /// Attach a media lookup collaborator
    ///
    /// The lookup resolves attachment ids to original, unscaled asset URLs;
    /// images it cannot resolve fall back to thumbnail-suffix stripping.
    pub fn with_media_lookup(mut self, media: Box<dyn MediaLookup>) -> Self {
        self.media = media;
        self
    }

    /// Convert a content string to a Markdown body
    ///
    /// Always returns a best-effort string; malformed markup degrades to
    /// passthrough text rather than failing the conversion. An input with no
    /// renderable content yields an empty string — whether that is an error
    /// is the caller's decision (see [`MarkdownConverter::convert_post`]).
    pub fn convert(&self, content: &str) -> String {
        render_blocks(&self.segment_content(content))
    }

    /// Convert a post: front matter + body, plus the export filename
    ///
    /// Mirrors the shape a bulk exporter needs per post. Returns
    /// [`ConversionError::EmptyContent`] when the body came out empty, so one
    /// contentless post can be recorded as failed without halting a batch.
    /// Soft problems ride along in [`PostExport::warnings`] instead of
    /// failing the conversion.
    pub fn convert_post(
        &self,
        content: &str,
        meta: &PostMetadata,
    ) -> Result<PostExport, ConversionError> {
        let blocks = self.segment_content(content);
        let body = render_blocks(&blocks);
        if body.is_empty() {
            return Err(ConversionError::EmptyContent);
        }

        let markdown = if self.options.include_front_matter {
            let mut document = format_front_matter(meta);
            document.push_str(&body);
            document
        } else {
            body
        };

        let filename = generate_filename(
            &meta.title,
            meta.publish_date.map(|dt| dt.date()),
            self.options.add_date_prefix,
        );

        Ok(PostExport {
            markdown,
            filename,
            warnings: media_warnings(&blocks),
        })
    }

    /// Sanitize, parse, and segment content into its block tree
    fn segment_content(&self, content: &str) -> Vec<BlockNode> {
        let sanitized = sanitize(content);
        let dom = parse_html(&sanitized);

        match find_body(&dom) {
            Some(body) => segment(&body, self.media.as_ref()),
            None => Vec::new(),
        }
    }
}

fn render_blocks(blocks: &[BlockNode]) -> String {
    let rendered: Vec<String> = blocks.iter().map(BlockNode::render).collect();
    assemble(&rendered)
}

/// Collect soft media problems from a block tree
///
/// An image that resolved to an empty URL still renders (alt-only), but the
/// caller gets a [`ConversionError::MissingMediaSource`] per occurrence.
fn media_warnings(blocks: &[BlockNode]) -> Vec<ConversionError> {
    let mut warnings = Vec::new();
    for block in blocks {
        match block {
            BlockNode::Media(images) => {
                for image in images {
                    check_image(image, &mut warnings);
                }
            }
            BlockNode::Heading { content, .. }
            | BlockNode::Paragraph(content)
            | BlockNode::Passthrough(content) => span_warnings(content, &mut warnings),
            BlockNode::Blockquote(paragraphs) => {
                for paragraph in paragraphs {
                    span_warnings(paragraph, &mut warnings);
                }
            }
            BlockNode::List(list) => list_warnings(list, &mut warnings),
            BlockNode::CodeBlock { .. } | BlockNode::HorizontalRule => {}
        }
    }
    warnings
}

fn list_warnings(list: &List, warnings: &mut Vec<ConversionError>) {
    for item in &list.items {
        span_warnings(&item.content, warnings);
        if let Some(nested) = &item.nested {
            list_warnings(nested, warnings);
        }
    }
}

fn span_warnings(spans: &[InlineSpan], warnings: &mut Vec<ConversionError>) {
    for span in spans {
        match span {
            InlineSpan::Image(image) => check_image(image, warnings),
            InlineSpan::Bold(children)
            | InlineSpan::Italic(children)
            | InlineSpan::Link { children, .. } => span_warnings(children, warnings),
            _ => {}
        }
    }
}

fn check_image(image: &ImageRef, warnings: &mut Vec<ConversionError>) {
    if image.url.is_empty() {
        warnings.push(ConversionError::MissingMediaSource(format!(
            "image \"{}\" has no resolvable source",
            image.alt
        )));
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}
