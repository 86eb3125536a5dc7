//! Error types for conversion operations
//!
//! The engine never fails hard on bad markup: malformed input degrades to
//! passthrough text and missing media degrades to an alt-only image. These
//! variants exist so callers can classify what went soft during a conversion
//! and decide per-post whether an export counts as a failure.

use std::fmt;

/// Errors that can occur during HTML to Markdown conversion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionError {
    /// Markup could not be interpreted structurally; content was passed
    /// through as plain text instead
    MalformedMarkup(String),
    /// An image had no resolvable source URL
    MissingMediaSource(String),
    /// The whole conversion produced no renderable text
    EmptyContent,
}

impl fmt::Display for ConversionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionError::MalformedMarkup(msg) => write!(f, "Malformed markup: {}", msg),
            ConversionError::MissingMediaSource(msg) => {
                write!(f, "Missing media source: {}", msg)
            }
            ConversionError::EmptyContent => write!(f, "No content to convert"),
        }
    }
}

impl std::error::Error for ConversionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = ConversionError::MalformedMarkup("unterminated tag".to_string());
        assert!(err.to_string().contains("unterminated tag"));

        let err = ConversionError::MissingMediaSource("img without src".to_string());
        assert!(err.to_string().contains("img without src"));

        assert_eq!(
            ConversionError::EmptyContent.to_string(),
            "No content to convert"
        );
    }
}
