//! Document-level types.

use super::Paragraph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A parsed DOCX document: metadata plus the ordered item stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, creator, etc.)
    pub metadata: Metadata,

    /// Paragraphs and tables in original document order
    pub items: Vec<Item>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item, keeping paragraph positions consistent.
    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    /// Ordered view of the document's paragraphs.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.items.iter().filter_map(|item| match item {
            Item::Paragraph(p) => Some(p),
            Item::Table(_) => None,
        })
    }

    /// Ordered view of the document's tables with their item positions.
    pub fn tables(&self) -> impl Iterator<Item = (usize, &RawTable)> {
        self.items.iter().enumerate().filter_map(|(i, item)| match item {
            Item::Table(t) => Some((i, t)),
            Item::Paragraph(_) => None,
        })
    }

    /// Number of paragraphs.
    pub fn paragraph_count(&self) -> usize {
        self.paragraphs().count()
    }

    /// Number of tables.
    pub fn table_count(&self) -> usize {
        self.tables().count()
    }

    /// Whether the document has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Plain text of all paragraphs, blank-line separated.
    pub fn plain_text(&self) -> String {
        self.paragraphs()
            .map(|p| p.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// One document item: a paragraph or a raw table, inspected via an
/// explicit discriminant during traversal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    /// A text paragraph
    Paragraph(Paragraph),
    /// A table in physical (pre-merge) cell representation
    Table(RawTable),
}

/// A table as the container format delivers it: row-major physical cells,
/// with merged regions already expanded into repeated identical texts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTable {
    /// Physical rows of cell text
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    /// Create a raw table from physical rows.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Number of physical rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Document metadata from docProps/core.xml.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document creator
    pub creator: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_views_preserve_order() {
        let mut doc = Document::new();
        doc.push(Item::Paragraph(Paragraph::with_text("before", 0)));
        doc.push(Item::Table(RawTable::new(vec![vec!["A".to_string()]])));
        doc.push(Item::Paragraph(Paragraph::with_text("after", 2)));

        let texts: Vec<_> = doc.paragraphs().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, ["before", "after"]);

        let positions: Vec<_> = doc.tables().map(|(i, _)| i).collect();
        assert_eq!(positions, [1]);
        assert_eq!(doc.paragraph_count(), 2);
        assert_eq!(doc.table_count(), 1);
    }

    #[test]
    fn test_plain_text_joins_paragraphs() {
        let mut doc = Document::new();
        doc.push(Item::Paragraph(Paragraph::with_text("one", 0)));
        doc.push(Item::Paragraph(Paragraph::with_text("two", 1)));
        assert_eq!(doc.plain_text(), "one\n\ntwo");
    }
}
