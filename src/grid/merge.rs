//! Merge reconciliation: physical rows to logical grid.
//!
//! Horizontal merge coalesces runs of identical-text neighbors into one
//! cell carrying the summed column span. Vertical merge compares each row
//! positionally against the previous reconciled row; a cell is a
//! continuation only when text and column span match the aligned
//! predecessor and the running column offsets line up exactly. There is no
//! fuzzy alignment.

use super::{Cell, CellRef, Grid};

/// Coalesce consecutive identical-text cells of one physical row.
///
/// Returns `(text, col_span)` pairs; a row with no duplicate-adjacent
/// cells comes back unchanged with unit spans.
pub fn merge_horizontally(row: Vec<String>) -> Vec<(String, usize)> {
    let mut merged: Vec<(String, usize)> = Vec::new();

    for text in row {
        match merged.last_mut() {
            Some((current, span)) if *current == text => *span += 1,
            _ => merged.push((text, 1)),
        }
    }

    merged
}

/// Reconcile raw physical rows into a logical [`Grid`].
pub(super) fn reconcile(raw: Vec<Vec<String>>) -> Grid {
    let mut grid = Grid::default();
    // Previous reconciled row, kept for positional alignment.
    let mut prev: Vec<CellRef> = Vec::new();

    for (row_index, raw_row) in raw.into_iter().enumerate() {
        let merged = merge_horizontally(raw_row);
        let mut out: Vec<CellRef> = Vec::with_capacity(merged.len());

        let mut offset = 0usize;
        let mut prev_offset = 0usize;

        for (i, (text, col_span)) in merged.into_iter().enumerate() {
            let aligned = prev.get(i).copied();

            let is_continuation = row_index > 0
                && aligned.is_some_and(|r| {
                    let origin = grid.cell(r);
                    origin.text() == text
                        && origin.col_span() == col_span
                        && prev_offset == offset
                });

            if let (true, Some(above)) = (is_continuation, aligned) {
                let origin = above.origin();
                grid.increment_row_span(origin);
                out.push(CellRef::Placeholder(origin));
            } else {
                let index = grid.push_origin(Cell::with_spans(text, 1, col_span));
                out.push(CellRef::Origin(index));
            }

            offset += col_span;
            if let Some(r) = aligned {
                prev_offset += grid.cell(r).col_span();
            }
        }

        grid.push_row(out.clone());
        prev = out;
    }

    grid
}
