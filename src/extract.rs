//! Table extraction orchestration.
//!
//! Ties the pieces together: for every table in a parsed document the
//! context assembler determines id/title/kind and harvests the
//! explanatory paragraphs, the merge reconciler rebuilds the logical
//! grid, and the results land in one serializable record per table.
//! A rayon-parallel batch driver runs the pipeline over directories;
//! a single bad table or document never aborts a batch run.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::context::{ContextAssembler, Lexicon};
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::model::{Document, ScoredContext, TableRecord};
use crate::parser::{DocxParser, ParseOptions};
use crate::rank::ContextRanker;

/// Extracts table records from parsed documents.
pub struct TableExtractor<'a> {
    options: ParseOptions,
    lexicon: Lexicon,
    ranker: Option<&'a dyn ContextRanker>,
}

impl<'a> TableExtractor<'a> {
    /// Create an extractor with the given options.
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            lexicon: Lexicon::new(),
            ranker: None,
        }
    }

    /// Attach an external semantic ranker (structured context mode).
    pub fn with_ranker(mut self, ranker: &'a dyn ContextRanker) -> Self {
        self.ranker = Some(ranker);
        self
    }

    /// Extract one record per table in document order.
    ///
    /// `label_for` supplies the opaque destination key for the i-th table.
    pub fn extract<F>(&self, document: &Document, label_for: F) -> Vec<TableRecord>
    where
        F: Fn(usize) -> String,
    {
        let assembler = ContextAssembler::new(&self.lexicon, self.options.context_window_size);
        let mut records = Vec::new();

        for (index, (position, raw)) in document.tables().enumerate() {
            let grid = Grid::from_raw_rows(raw.rows.clone());
            let ctx = assembler.assemble(document, position);

            let mut record = TableRecord::new(label_for(index), grid.to_records());
            record.id = ctx.classification.id;
            record.title = ctx.classification.title;
            record.kind = ctx.classification.kind;
            record.context = ctx.context;

            if let Some(ranker) = self.ranker {
                record.contexts = self.rank_contexts(ranker, document, &grid);
            }

            records.push(record);
        }

        records
    }

    /// Query the external ranker with the flattened table against all
    /// non-blank paragraphs. Non-isotropic tables have no flat text and
    /// keep the heuristic context only.
    fn rank_contexts(
        &self,
        ranker: &dyn ContextRanker,
        document: &Document,
        grid: &Grid,
    ) -> Option<Vec<ScoredContext>> {
        let query = match grid.as_text() {
            Ok(text) => text,
            Err(_) => {
                log::debug!("table is not isotropic, skipping semantic ranking");
                return None;
            }
        };

        let paragraphs: Vec<_> = document.paragraphs().filter(|p| !p.is_empty()).collect();
        if paragraphs.is_empty() {
            return None;
        }
        let candidates: Vec<&str> = paragraphs.iter().map(|p| p.text.as_str()).collect();

        let contexts = ranker
            .rank(&query, &candidates)
            .into_iter()
            .filter_map(|(score, index)| {
                paragraphs.get(index).map(|p| ScoredContext {
                    paragraph: p.position,
                    score: score.clamp(0.0, 1.0),
                })
            })
            .collect();
        Some(contexts)
    }
}

/// Extract all table records from a DOCX file.
///
/// Labels are derived from the file stem: `report.docx` yields
/// `report.0`, `report.1`, ... with spaces replaced by underscores.
pub fn extract_file<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Vec<TableRecord>> {
    let path = path.as_ref();
    let parser = DocxParser::open_with_options(path, options.clone())?;
    let document = parser.parse()?;

    let stem = file_label_stem(path);
    let extractor = TableExtractor::new(options);
    Ok(extractor.extract(&document, |i| format!("{}.{}", stem, i)))
}

fn file_label_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(' ', "_"))
        .unwrap_or_else(|| "table".to_string())
}

/// Outcome of a batch extraction run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Files processed successfully
    pub files_ok: usize,
    /// Files that failed to parse
    pub files_failed: usize,
    /// Table records written
    pub tables_extracted: usize,
}

impl BatchSummary {
    fn merge(self, other: Self) -> Self {
        Self {
            files_ok: self.files_ok + other.files_ok,
            files_failed: self.files_failed + other.files_failed,
            tables_extracted: self.tables_extracted + other.tables_extracted,
        }
    }
}

/// Extract every `.docx` file under `source` into one JSON file per
/// table under `destination`, in parallel across files.
///
/// Per-file failures are logged and counted; they never abort the batch.
pub fn extract_dir<P: AsRef<Path>, Q: AsRef<Path>>(
    source: P,
    destination: Q,
    options: &ParseOptions,
) -> Result<BatchSummary> {
    let destination = destination.as_ref();
    fs::create_dir_all(destination)?;

    let files = docx_files(source.as_ref())?;

    let summary = files
        .par_iter()
        .map(|file| match write_records(file, destination, options) {
            Ok(count) => BatchSummary {
                files_ok: 1,
                tables_extracted: count,
                ..Default::default()
            },
            Err(e) => {
                log::warn!("skipping {}: {}", file.display(), e);
                BatchSummary {
                    files_failed: 1,
                    ..Default::default()
                }
            }
        })
        .reduce(BatchSummary::default, BatchSummary::merge);

    Ok(summary)
}

/// List `.docx` files directly under a directory, sorted by name.
pub fn docx_files(source: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(source)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("docx"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

fn write_records(file: &Path, destination: &Path, options: &ParseOptions) -> Result<usize> {
    let records = extract_file(file, options.clone())?;
    for record in &records {
        let output = destination.join(format!("{}.json", record.label));
        let json = serde_json::to_string_pretty(record)
            .map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))?;
        fs::write(output, json)?;
    }
    Ok(records.len())
}
