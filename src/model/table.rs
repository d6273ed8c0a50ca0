//! Extracted table record and structural classification.

use crate::grid::CellRecord;
use serde::{Deserialize, Serialize};

/// Structural classification of a table, driving which reference
/// heuristics apply during context assembly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// A plain numbered table
    #[default]
    Table,
    /// A table inside an appendix ("приложение")
    Application,
    /// A fill-in form ("форма")
    Form,
}

/// One paragraph reference scored by an external ranker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredContext {
    /// Position of the paragraph in the document item stream
    pub paragraph: usize,

    /// Relevance score in `[0, 1]`
    pub score: f32,
}

/// The serializable per-table extraction result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRecord {
    /// Record discriminant, always `"table"`
    #[serde(rename = "type", default = "type_label")]
    pub type_label: String,

    /// Opaque destination key supplied by the caller
    pub label: String,

    /// Document-assigned identifier such as "5.2" or "Б.1"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Title assembled from nearby paragraphs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Structural kind
    pub kind: TableKind,

    /// Reconciled grid rows; placeholders carry only `id`
    pub rows: Vec<Vec<CellRecord>>,

    /// Joined explanatory paragraph text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// Ranked paragraph references (structured mode)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contexts: Option<Vec<ScoredContext>>,
}

fn type_label() -> String {
    "table".to_string()
}

impl TableRecord {
    /// Create a record with the given destination label and grid rows.
    pub fn new(label: impl Into<String>, rows: Vec<Vec<CellRecord>>) -> Self {
        Self {
            type_label: type_label(),
            label: label.into(),
            id: None,
            title: None,
            kind: TableKind::Table,
            rows,
            context: None,
            contexts: None,
        }
    }

    /// Number of grid rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of grid positions in the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TableKind::Table).unwrap(), "\"table\"");
        assert_eq!(
            serde_json::to_string(&TableKind::Application).unwrap(),
            "\"application\""
        );
        assert_eq!(serde_json::to_string(&TableKind::Form).unwrap(), "\"form\"");
    }

    #[test]
    fn test_record_omits_null_fields() {
        let record = TableRecord::new("doc.0", Vec::new());
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"type\":\"table\""));
        assert!(json.contains("\"label\":\"doc.0\""));
        assert!(!json.contains("\"id\""));
        assert!(!json.contains("\"context\""));
    }

    #[test]
    fn test_record_round_trips() {
        let mut record = TableRecord::new("doc.1", Vec::new());
        record.id = Some("5.2".to_string());
        record.kind = TableKind::Form;

        let json = serde_json::to_string(&record).unwrap();
        let back: TableRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id.as_deref(), Some("5.2"));
        assert_eq!(back.kind, TableKind::Form);
    }
}
