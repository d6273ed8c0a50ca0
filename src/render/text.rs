//! Plain text rendering.

use crate::error::Result;
use crate::grid::Grid;
use crate::model::{Document, TableRecord};

/// Flatten a table record to tab-separated rows.
///
/// Only isotropic tables (rectangular, no merged cells) have a
/// faithful flat form; anything else fails with [`crate::Error::Shape`].
pub fn to_text(record: &TableRecord) -> Result<String> {
    let grid = Grid::from_records(&record.rows)?;
    grid.as_text()
}

/// Convert a document's paragraph stream to plain text.
pub fn document_to_text(doc: &Document) -> String {
    doc.plain_text().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Item, Paragraph, RawTable};

    #[test]
    fn test_to_text_isotropic() {
        let grid = Grid::from_raw_rows(vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["1".to_string(), "2".to_string()],
        ]);
        let record = TableRecord::new("t.0", grid.to_records());

        assert_eq!(to_text(&record).unwrap(), "a\tb\n1\t2");
    }

    #[test]
    fn test_to_text_rejects_merged_cells() {
        let grid = Grid::from_raw_rows(vec![
            vec!["x".to_string()],
            vec!["x".to_string()],
        ]);
        let record = TableRecord::new("t.0", grid.to_records());

        assert!(to_text(&record).is_err());
    }

    #[test]
    fn test_document_to_text() {
        let mut doc = Document::new();
        doc.push(Item::Paragraph(Paragraph::with_text("Hello, world!", 0)));
        doc.push(Item::Table(RawTable::new(vec![vec!["skip".to_string()]])));
        doc.push(Item::Paragraph(Paragraph::with_text("Second paragraph.", 2)));

        let result = document_to_text(&doc);
        assert!(result.contains("Hello, world!"));
        assert!(result.contains("Second paragraph."));
    }
}
