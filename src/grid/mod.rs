//! Logical table grid built from physical DOCX cells.
//!
//! DOCX represents merged regions physically: a horizontally merged cell
//! appears as repeated identical cells, a vertically merged cell as a
//! continuation marker that inherits the text above. This module rebuilds
//! the logical grid: origin cells own their text and span extents, and
//! every absorbed position becomes a [`CellRef::Placeholder`] pointing back
//! at its origin through a per-table arena (no shared mutable aliases).

mod merge;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Process-wide counter backing lazily assigned cell identity tokens.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

fn next_token() -> String {
    let n = NEXT_TOKEN.fetch_add(1, Ordering::Relaxed);
    // Opaque, unique within a process run. Shaped like a short UUID so
    // downstream consumers treat it as such.
    format!("{:08x}-{:04x}", n, (n.wrapping_mul(0x9e37)) & 0xffff)
}

/// An origin cell: the top-left cell of a merged span, sole owner of its
/// text and span extents.
#[derive(Debug)]
pub struct Cell {
    text: String,
    row_span: usize,
    col_span: usize,
    id: OnceLock<String>,
}

impl Cell {
    /// Create a cell with unit spans.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_spans(text, 1, 1)
    }

    /// Create a cell with explicit spans.
    pub fn with_spans(text: impl Into<String>, row_span: usize, col_span: usize) -> Self {
        Self {
            text: text.into(),
            row_span: row_span.max(1),
            col_span: col_span.max(1),
            id: OnceLock::new(),
        }
    }

    /// The cell text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Number of rows this cell spans.
    pub fn row_span(&self) -> usize {
        self.row_span
    }

    /// Number of columns this cell spans.
    pub fn col_span(&self) -> usize {
        self.col_span
    }

    /// The identity token, assigned on first access.
    pub fn id(&self) -> &str {
        self.id.get_or_init(next_token)
    }

    fn with_id(text: String, row_span: usize, col_span: usize, id: String) -> Self {
        let cell = Self::with_spans(text, row_span, col_span);
        let _ = cell.id.set(id);
        cell
    }
}

/// A grid position: either an origin cell or a placeholder absorbed into
/// an earlier cell's span. Both variants index into the owning grid's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRef {
    /// An origin cell at this arena index.
    Origin(usize),
    /// A position absorbed by the origin at this arena index.
    Placeholder(usize),
}

impl CellRef {
    /// Arena index of the origin this reference resolves to.
    pub fn origin(&self) -> usize {
        match *self {
            CellRef::Origin(i) | CellRef::Placeholder(i) => i,
        }
    }

    /// Whether this position is a placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, CellRef::Placeholder(_))
    }
}

/// Serialized form of one grid position.
///
/// Origins carry `{id, text, rows, cols}`; placeholders carry `{id}` only,
/// deferring text and span lookup to the origin at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRecord {
    /// Identity token of the origin cell.
    pub id: String,

    /// Cell text (absent for placeholders).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Row span (absent for placeholders).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,

    /// Column span (absent for placeholders).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cols: Option<usize>,
}

impl CellRecord {
    /// Whether this record denotes a placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.text.is_none()
    }
}

/// A reconciled logical grid: a cell arena plus rows of [`CellRef`]s.
#[derive(Debug, Default)]
pub struct Grid {
    cells: Vec<Cell>,
    rows: Vec<Vec<CellRef>>,
}

impl Grid {
    /// Build a grid from raw physical rows of cell text, applying
    /// horizontal then vertical merge reconciliation.
    pub fn from_raw_rows<S: Into<String>>(raw: Vec<Vec<S>>) -> Self {
        let rows: Vec<Vec<String>> = raw
            .into_iter()
            .map(|row| row.into_iter().map(Into::into).collect())
            .collect();
        merge::reconcile(rows)
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of grid positions in the widest row.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Whether the grid has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The rows of cell references.
    pub fn rows(&self) -> &[Vec<CellRef>] {
        &self.rows
    }

    /// Resolve a reference to its origin cell.
    pub fn cell(&self, cell_ref: CellRef) -> &Cell {
        &self.cells[cell_ref.origin()]
    }

    /// Whether every row has equal length and no placeholder remains.
    ///
    /// Only isotropic grids are safe to flatten to plain text. A grid with
    /// no rows, or whose first row is empty, is degenerate and never
    /// isotropic.
    pub fn is_isotropic(&self) -> bool {
        let Some(first) = self.rows.first() else {
            return false;
        };
        if first.is_empty() {
            return false;
        }
        let width = first.len();
        self.rows
            .iter()
            .all(|row| row.len() == width && row.iter().all(|r| !r.is_placeholder()))
    }

    /// Flatten the grid to tab-separated text, one line per row.
    ///
    /// Fails with [`Error::Shape`] when rows have unequal length or contain
    /// unmerged placeholders; never silently truncates.
    pub fn as_text(&self) -> Result<String> {
        if !self.is_isotropic() {
            return Err(Error::Shape(
                "rows have unequal length or contain unmerged placeholders".to_string(),
            ));
        }
        let lines: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|r| self.cell(*r).text())
                    .collect::<Vec<_>>()
                    .join("\t")
            })
            .collect();
        Ok(lines.join("\n"))
    }

    /// Serialize the grid to row-major [`CellRecord`]s.
    pub fn to_records(&self) -> Vec<Vec<CellRecord>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|r| {
                        let cell = self.cell(*r);
                        if r.is_placeholder() {
                            CellRecord {
                                id: cell.id().to_string(),
                                text: None,
                                rows: None,
                                cols: None,
                            }
                        } else {
                            CellRecord {
                                id: cell.id().to_string(),
                                text: Some(cell.text().to_string()),
                                rows: Some(cell.row_span()),
                                cols: Some(cell.col_span()),
                            }
                        }
                    })
                    .collect()
            })
            .collect()
    }

    /// Rebuild a grid from serialized records.
    ///
    /// The first occurrence of an id must be an origin record; placeholder
    /// records must reference an id seen earlier. Identity tokens are
    /// preserved, so a serialize/deserialize round trip is exact.
    pub fn from_records(records: &[Vec<CellRecord>]) -> Result<Self> {
        let mut grid = Grid::default();
        let mut by_id: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();

        for row in records {
            let mut out = Vec::with_capacity(row.len());
            for record in row {
                match (&record.text, by_id.get(record.id.as_str())) {
                    (None, Some(&origin)) => out.push(CellRef::Placeholder(origin)),
                    (None, None) => {
                        return Err(Error::MalformedTable(format!(
                            "placeholder references unknown cell {}",
                            record.id
                        )));
                    }
                    (Some(text), _) => {
                        let index = grid.cells.len();
                        grid.cells.push(Cell::with_id(
                            text.clone(),
                            record.rows.unwrap_or(1),
                            record.cols.unwrap_or(1),
                            record.id.clone(),
                        ));
                        by_id.insert(record.id.as_str(), index);
                        out.push(CellRef::Origin(index));
                    }
                }
            }
            grid.rows.push(out);
        }

        Ok(grid)
    }

    pub(crate) fn push_origin(&mut self, cell: Cell) -> usize {
        self.cells.push(cell);
        self.cells.len() - 1
    }

    pub(crate) fn push_row(&mut self, row: Vec<CellRef>) {
        self.rows.push(row);
    }

    pub(crate) fn increment_row_span(&mut self, origin: usize) {
        self.cells[origin].row_span += 1;
    }
}

pub use merge::merge_horizontally;
