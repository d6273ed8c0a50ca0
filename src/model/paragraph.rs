//! Paragraph type.

use serde::{Deserialize, Serialize};

/// A document paragraph, immutable once parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paragraph {
    /// Whitespace-normalized paragraph text
    pub text: String,

    /// Paragraph style id (e.g. a heading style), if any
    pub style: Option<String>,

    /// Whether the paragraph carries a bold run/character style
    pub bold: bool,

    /// Document order index among all items
    pub position: usize,
}

impl Paragraph {
    /// Create a paragraph.
    pub fn new(text: impl Into<String>, style: Option<String>, bold: bool, position: usize) -> Self {
        Self {
            text: text.into(),
            style,
            bold,
            position,
        }
    }

    /// Create a plain paragraph with just text (tests and fixtures).
    pub fn with_text(text: impl Into<String>, position: usize) -> Self {
        Self::new(text, None, false, position)
    }

    /// Whether the paragraph text is blank.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Whether the paragraph is styled as a top-level heading.
    pub fn is_heading(&self) -> bool {
        self.style.as_deref() == Some("1")
    }
}
