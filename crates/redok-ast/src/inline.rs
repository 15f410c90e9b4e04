//! Inline elements for document content
//!
//! This module defines the formatted text run, the inline-level unit
//! carried by paragraphs, headings, list items and callout bodies.

use serde::{Deserialize, Serialize};

/// A contiguous span of text sharing one set of character properties
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TextRun {
    /// The text content
    pub text: String,
    /// Bold formatting
    #[serde(default)]
    pub bold: bool,
    /// Italic formatting
    #[serde(default)]
    pub italic: bool,
    /// Underline formatting
    #[serde(default)]
    pub underline: bool,
    /// Strikethrough formatting
    #[serde(default)]
    pub strikethrough: bool,
    /// Explicit text color (hex, no leading '#'), if the source set one
    #[serde(default)]
    pub color: Option<String>,
    /// Explicit font size in points, if the source set one
    #[serde(default)]
    pub font_size: Option<f32>,
    /// Hyperlink target URL, if this run is a link
    #[serde(default)]
    pub hyperlink: Option<String>,
}

impl TextRun {
    /// Create an unformatted run
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Create a bold run
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
            ..Self::default()
        }
    }

    /// Whether the run carries no formatting at all
    pub fn is_plain(&self) -> bool {
        !self.bold
            && !self.italic
            && !self.underline
            && !self.strikethrough
            && self.color.is_none()
            && self.font_size.is_none()
            && self.hyperlink.is_none()
    }
}

/// Concatenate the text of a run sequence
pub fn plain_text(runs: &[TextRun]) -> String {
    runs.iter().map(|r| r.text.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_run() {
        let run = TextRun::plain("Hello");
        assert_eq!(run.text, "Hello");
        assert!(run.is_plain());
    }

    #[test]
    fn test_bold_run() {
        let run = TextRun::bold("important");
        assert!(run.bold);
        assert!(!run.is_plain());
    }

    #[test]
    fn test_plain_text_concatenation() {
        let runs = vec![TextRun::plain("Hello "), TextRun::bold("world")];
        assert_eq!(plain_text(&runs), "Hello world");
    }

    #[test]
    fn test_serde_skips_defaults_on_input() {
        let run: TextRun = serde_json::from_str(r#"{"text": "x"}"#).unwrap();
        assert_eq!(run, TextRun::plain("x"));
    }
}
