//! Image reference resolution for figures and galleries
//!
//! WordPress wraps images in several layers of markup depending on editor
//! vintage: block-editor `<figure>` elements, classic `<div class="wp-caption">`
//! wrappers, and gallery containers holding many of either. This module
//! extracts the image references from those wrappers and resolves each to its
//! best-available source URL.
//!
//! # Source resolution
//!
//! For each `<img>`, resolution prefers an original, unscaled asset:
//!
//! 1. If the class list carries a `wp-image-NNN` attachment id, ask the
//!    injected [`MediaLookup`] collaborator for the original URL.
//! 2. Otherwise fall back to the `src` attribute, stripping a
//!    `-WIDTHxHEIGHT.` thumbnail suffix when one is present
//!    (`photo-300x200.jpg` becomes `photo.jpg`).
//!
//! An image with no recoverable source at all is kept with an empty URL so
//! the caller can spot and log it; one damaged image never aborts an export.
//!
//! # Caption pairing
//!
//! A caption is associated with an image only if it immediately follows that
//! image's tag in source order (first-match policy). Galleries whose captions
//! appear out of order are not guaranteed correct pairing; that is a known
//! limitation of the source grammar, not something silently repaired here.

use crate::parser::{class_contains, element_name, get_attr, text_content};
use markup5ever_rcdom::{Handle, NodeData};
use regex::Regex;
use std::sync::OnceLock;

/// Alt text used when an image carries none
pub const DEFAULT_ALT: &str = "Image";

/// External collaborator that maps attachment ids to original asset URLs
///
/// The host application owns the media library; the engine only knows how to
/// pull an attachment id out of markup. When no lookup is available (or the
/// id is unknown), resolution falls back to URL-pattern stripping.
pub trait MediaLookup {
    /// Resolve an attachment id to the unscaled original asset URL
    fn resolve_original_url(&self, attachment_id: u64) -> Option<String>;
}

/// Lookup that never resolves; forces the URL-pattern fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMediaLookup;

impl MediaLookup for NoMediaLookup {
    fn resolve_original_url(&self, _attachment_id: u64) -> Option<String> {
        None
    }
}

/// A resolved image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    /// Source URL; empty when no source was recoverable
    pub url: String,
    /// Alt text; defaults to [`DEFAULT_ALT`] when absent or empty
    pub alt: String,
    /// Caption, rendered as a quoted Markdown title suffix
    pub caption: Option<String>,
}

impl ImageRef {
    /// Render as a Markdown image: `![alt](url)` or `![alt](url "caption")`
    pub fn to_markdown(&self) -> String {
        match &self.caption {
            Some(caption) => {
                let escaped = caption.replace('"', "\\\"");
                format!("![{}]({} \"{}\")", self.alt, self.url, escaped)
            }
            None => format!("![{}]({})", self.alt, self.url),
        }
    }
}

/// Build an [`ImageRef`] from an `<img>` element
///
/// Returns `None` when the node is not an `img` element. An `img` with no
/// attachment id and no `src` still yields a reference, with an empty URL.
pub fn image_from_node(node: &Handle, lookup: &dyn MediaLookup) -> Option<ImageRef> {
    if element_name(node).as_deref() != Some("img") {
        return None;
    }

    let url = resolve_source(node, lookup);

    let alt = match get_attr(node, "alt") {
        Some(alt) if !alt.trim().is_empty() => alt.trim().to_string(),
        _ => DEFAULT_ALT.to_string(),
    };

    Some(ImageRef {
        url,
        alt,
        caption: None,
    })
}

/// Resolve a single figure wrapper to an image reference
///
/// Finds the first `<img>` descendant and the first caption element that
/// follows it in document order.
pub fn resolve_block_image(figure: &Handle, lookup: &dyn MediaLookup) -> Option<ImageRef> {
    let mut images = resolve_images(figure, lookup);
    if images.is_empty() {
        return None;
    }
    Some(images.remove(0))
}

/// Resolve every image inside a gallery wrapper, in document order
///
/// Each image resolves independently. Captions pair with the image they
/// immediately follow; a caption with no preceding unpaired image is dropped.
pub fn resolve_gallery(gallery: &Handle, lookup: &dyn MediaLookup) -> Vec<ImageRef> {
    resolve_images(gallery, lookup)
}

/// Walk a wrapper's descendants collecting images and pairing captions
fn resolve_images(wrapper: &Handle, lookup: &dyn MediaLookup) -> Vec<ImageRef> {
    let mut images: Vec<ImageRef> = Vec::new();
    // Index of the most recent image still awaiting a caption
    let mut pending: Option<usize> = None;
    collect_images(wrapper, lookup, &mut images, &mut pending);
    images
}

fn collect_images(
    node: &Handle,
    lookup: &dyn MediaLookup,
    images: &mut Vec<ImageRef>,
    pending: &mut Option<usize>,
) {
    if let NodeData::Element { .. } = node.data {
        if let Some(image) = image_from_node(node, lookup) {
            images.push(image);
            *pending = Some(images.len() - 1);
            return;
        }

        if is_caption_element(node) {
            if let Some(index) = pending.take() {
                let caption = text_content(node);
                if !caption.is_empty() {
                    images[index].caption = Some(caption);
                }
            }
            // A caption with no pending image is dropped, not re-paired
            return;
        }
    }

    for child in node.children.borrow().iter() {
        collect_images(child, lookup, images, pending);
    }
}

/// Caption markers across editor vintages: `<figcaption>` (block editor),
/// `.wp-caption-text` (classic), `.gallery-caption` (gallery shortcode)
fn is_caption_element(node: &Handle) -> bool {
    match element_name(node).as_deref() {
        Some("figcaption") => true,
        Some(_) => class_contains(node, "wp-caption-text") || class_contains(node, "gallery-caption"),
        None => false,
    }
}

/// Resolve an `<img>` element's source URL
fn resolve_source(node: &Handle, lookup: &dyn MediaLookup) -> String {
    if let Some(id) = attachment_id(node)
        && let Some(original) = lookup.resolve_original_url(id)
    {
        return original;
    }

    match get_attr(node, "src") {
        Some(src) if !src.trim().is_empty() => strip_size_suffix(src.trim()),
        _ => String::new(),
    }
}

/// Extract the attachment id from a `wp-image-NNN` class token
pub fn attachment_id(node: &Handle) -> Option<u64> {
    let classes = get_attr(node, "class")?;
    let re = attachment_id_pattern()?;
    re.captures(&classes)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Strip a `-WIDTHxHEIGHT` scaled-thumbnail suffix from a URL
///
/// `https://cdn.test/photo-300x200.jpg` becomes `https://cdn.test/photo.jpg`.
/// URLs without the suffix pass through unchanged.
pub fn strip_size_suffix(url: &str) -> String {
    match size_suffix_pattern() {
        Some(re) => re.replace(url, "$ext").into_owned(),
        None => url.to_string(),
    }
}

fn attachment_id_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\bwp-image-(\d+)\b").ok()).as_ref()
}

fn size_suffix_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-\d+x\d+(?P<ext>\.[A-Za-z0-9]+)$").ok())
        .as_ref()
}
