//! Corpus statistics over extracted table records.
//!
//! Mirrors the shape of the serialized records: placeholder cells
//! carry no text and are excluded from cell counts and text-length
//! distributions, while still contributing to column width.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::model::TableRecord;

static NUMERIC: OnceLock<Regex> = OnceLock::new();

/// A string counts as numeric when it consists solely of digits and
/// non-word characters (separators, signs, punctuation).
pub fn is_numeric_text(text: &str) -> bool {
    let re = NUMERIC.get_or_init(|| Regex::new(r"^(?:[^\w]|[0-9])+$").unwrap());
    re.is_match(text)
}

/// Per-table structural statistics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TableStats {
    /// Number of grid rows
    pub rows: usize,
    /// Maximum row width, placeholders included
    pub cols: usize,
    /// Origin cells (placeholders excluded)
    pub cells: usize,
    /// Origin cells whose text is numeric
    pub numeric_cells: usize,
    /// Origin cells with empty text
    pub empty_cells: usize,
    /// Text length of every origin cell, in characters
    pub char_lengths: Vec<usize>,
}

impl TableStats {
    /// Compute statistics for one extracted record.
    pub fn of(record: &TableRecord) -> Self {
        let mut stats = TableStats::default();

        for row in &record.rows {
            stats.rows += 1;
            stats.cols = stats.cols.max(row.len());

            for cell in row {
                let Some(text) = cell.text.as_deref() else {
                    continue;
                };
                stats.cells += 1;
                stats.char_lengths.push(text.chars().count());
                if text.is_empty() {
                    stats.empty_cells += 1;
                } else if is_numeric_text(text) {
                    stats.numeric_cells += 1;
                }
            }
        }

        stats
    }

    /// A trivial table degenerates to a list or a single value.
    pub fn is_non_trivial(&self) -> bool {
        self.cells > 1 && self.rows > 1 && self.cols > 1
    }
}

/// Distribution percentiles reported for corpus-level counters.
pub const PERCENTILES: [f64; 5] = [5.0, 25.0, 50.0, 75.0, 95.0];

/// Linearly interpolated percentile over unsorted data.
pub fn percentile(data: &[usize], p: f64) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut sorted: Vec<usize> = data.to_vec();
    sorted.sort_unstable();

    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower] as f64;
    }
    let weight = rank - lower as f64;
    sorted[lower] as f64 * (1.0 - weight) + sorted[upper] as f64 * weight
}

/// Aggregate statistics over a set of table records.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusStats {
    /// Number of tables
    pub tables: usize,
    /// Combined serialized length of every record, in characters
    pub total_length: usize,
    /// Cell count of each table
    pub cells: Vec<usize>,
    /// Row count of each table
    pub rows: Vec<usize>,
    /// Column count of each table
    pub cols: Vec<usize>,
    /// Text length of every cell across all tables
    pub char_lengths: Vec<usize>,
}

impl CorpusStats {
    /// Aggregate over records, keeping only non-trivial tables when
    /// `non_trivial` is set.
    pub fn from_records(records: &[TableRecord], non_trivial: bool) -> Result<Self> {
        let mut corpus = CorpusStats::default();

        for record in records {
            let stats = TableStats::of(record);
            if non_trivial && !stats.is_non_trivial() {
                continue;
            }

            let json = serde_json::to_string_pretty(record)
                .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))?;

            corpus.tables += 1;
            corpus.total_length += json.chars().count();
            corpus.cells.push(stats.cells);
            corpus.rows.push(stats.rows);
            corpus.cols.push(stats.cols);
            corpus.char_lengths.extend(stats.char_lengths);
        }

        Ok(corpus)
    }

    fn percentile_line(data: &[usize]) -> String {
        PERCENTILES
            .iter()
            .map(|&p| format!("{}%: {:.1}", p, percentile(data, p)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for CorpusStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of tables: {}", self.tables)?;
        writeln!(f, "Total length: {}", self.total_length)?;
        writeln!(f, "Number of cells: {}", Self::percentile_line(&self.cells))?;
        writeln!(f, "Number of rows: {}", Self::percentile_line(&self.rows))?;
        writeln!(f, "Number of columns: {}", Self::percentile_line(&self.cols))?;
        write!(f, "Text length: {}", Self::percentile_line(&self.char_lengths))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;

    fn record(rows: Vec<Vec<String>>) -> TableRecord {
        TableRecord::new("t.0", Grid::from_raw_rows(rows).to_records())
    }

    #[test]
    fn test_numeric_text() {
        assert!(is_numeric_text("42"));
        assert!(is_numeric_text("1 234,5"));
        assert!(is_numeric_text("-0.25"));
        assert!(!is_numeric_text("С245"));
        assert!(!is_numeric_text("abc"));
        assert!(!is_numeric_text(""));
    }

    #[test]
    fn test_table_stats_excludes_placeholders() {
        // Second row repeats the first cell, so the reconciler turns it
        // into a placeholder without text.
        let stats = TableStats::of(&record(vec![
            vec!["A".to_string(), "1".to_string()],
            vec!["A".to_string(), "".to_string()],
        ]));

        assert_eq!(stats.rows, 2);
        assert_eq!(stats.cols, 2);
        assert_eq!(stats.cells, 3);
        assert_eq!(stats.numeric_cells, 1);
        assert_eq!(stats.empty_cells, 1);
        assert_eq!(stats.char_lengths, vec![1, 1, 0]);
    }

    #[test]
    fn test_non_trivial_filter() {
        let single = TableStats::of(&record(vec![vec!["x".to_string()]]));
        assert!(!single.is_non_trivial());

        let full = TableStats::of(&record(vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["c".to_string(), "d".to_string()],
        ]));
        assert!(full.is_non_trivial());
    }

    #[test]
    fn test_percentile_interpolation() {
        let data = vec![1, 2, 3, 4, 5];
        assert_eq!(percentile(&data, 50.0), 3.0);
        assert_eq!(percentile(&data, 25.0), 2.0);
        assert!((percentile(&data, 95.0) - 4.8).abs() < 1e-9);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_corpus_aggregation() {
        let records = vec![
            record(vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["1".to_string(), "2".to_string()],
            ]),
            record(vec![vec!["lonely".to_string()]]),
        ];

        let all = CorpusStats::from_records(&records, false).unwrap();
        assert_eq!(all.tables, 2);
        assert_eq!(all.rows, vec![2, 1]);

        let filtered = CorpusStats::from_records(&records, true).unwrap();
        assert_eq!(filtered.tables, 1);
        assert_eq!(filtered.cols, vec![2]);
        assert!(filtered.total_length > 0);
    }
}
