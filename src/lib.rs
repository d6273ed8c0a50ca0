//! # undocx
//!
//! Table extraction library for DOCX documents.
//!
//! This library parses Word documents, reconciles merged table cells
//! into an explicit origin/placeholder grid, and associates each table
//! with its caption and the explanatory paragraphs that reference it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use undocx::{extract_file, ParseOptions};
//!
//! fn main() -> undocx::Result<()> {
//!     // One record per table, with id, title, kind and context
//!     let records = extract_file("document.docx", ParseOptions::default())?;
//!
//!     for record in &records {
//!         println!("{}: {:?}", record.label, record.title);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Merge reconciliation**: repeated physical cells collapse into
//!   origin cells with spans plus placeholder back-references
//! - **Context association**: caption classification (table, form,
//!   appendix) and reference-driven context windows
//! - **Batch extraction**: Rayon-parallel directory processing, one
//!   JSON file per table
//! - **External ranking**: pluggable semantic scorer for structured
//!   context candidates

pub mod context;
pub mod detect;
pub mod error;
pub mod extract;
pub mod grid;
pub mod model;
pub mod parser;
pub mod rank;
pub mod render;
pub mod stats;

// Re-export commonly used types
pub use context::{Classification, ContextAssembler, Lexicon, DEFAULT_CONTEXT_WINDOW};
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_docx, is_docx_bytes, DocxFormat};
pub use error::{Error, Result};
pub use extract::{extract_dir, extract_file, BatchSummary, TableExtractor};
pub use grid::{merge_horizontally, Cell, CellRecord, CellRef, Grid};
pub use model::{
    Document, Item, Metadata, Paragraph, RawTable, ScoredContext, TableKind, TableRecord,
};
pub use parser::{DocxParser, ErrorMode, ParseOptions};
pub use rank::ContextRanker;
pub use render::JsonFormat;
pub use stats::{CorpusStats, TableStats};

use std::io::Read;
use std::path::Path;

/// Parse a DOCX file and return a structured document.
///
/// # Example
///
/// ```no_run
/// use undocx::parse_file;
///
/// let doc = parse_file("document.docx").unwrap();
/// println!("Tables: {}", doc.table_count());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = DocxParser::open(path)?;
    parser.parse()
}

/// Parse a DOCX file with custom options.
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = DocxParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse a DOCX document from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = DocxParser::from_bytes(data)?;
    parser.parse()
}

/// Parse a DOCX document from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let parser = DocxParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Parse a DOCX document from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = DocxParser::from_reader(reader)?;
    parser.parse()
}

/// Parse a DOCX document from a reader with custom options.
pub fn parse_reader_with_options<R: Read>(reader: R, options: ParseOptions) -> Result<Document> {
    let parser = DocxParser::from_reader_with_options(reader, options)?;
    parser.parse()
}

/// Extract the paragraph text of a DOCX file.
pub fn extract_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::document_to_text(&doc))
}

/// Parse a DOCX file and serialize the whole document to JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let doc = parse_file(path)?;
    render::to_json(&doc, format)
}

/// Fluent builder over the parse and extraction pipeline.
///
/// # Example
///
/// ```no_run
/// let records = undocx::Undocx::new()
///     .strict()
///     .with_context_window(8)
///     .parse("document.docx")?
///     .records();
/// # Ok::<(), undocx::Error>(())
/// ```
pub struct Undocx {
    options: ParseOptions,
}

impl Undocx {
    /// Create a new builder with default options.
    pub fn new() -> Self {
        Self {
            options: ParseOptions::default(),
        }
    }

    /// Skip malformed tables instead of failing (the default).
    pub fn lenient(mut self) -> Self {
        self.options = self.options.lenient();
        self
    }

    /// Fail on the first malformed table.
    pub fn strict(mut self) -> Self {
        self.options = self.options.strict();
        self
    }

    /// Set the context window budget.
    pub fn with_context_window(mut self, size: usize) -> Self {
        self.options = self.options.with_context_window(size);
        self
    }

    /// Toggle core-properties metadata extraction.
    pub fn with_metadata(mut self, extract: bool) -> Self {
        self.options = self.options.with_metadata(extract);
        self
    }

    /// Parse a DOCX file and return a result wrapper.
    pub fn parse<P: AsRef<Path>>(self, path: P) -> Result<UndocxResult> {
        let path = path.as_ref();
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().replace(' ', "_"))
            .unwrap_or_else(|| "table".to_string());
        let parser = DocxParser::open_with_options(path, self.options.clone())?;
        let document = parser.parse()?;
        Ok(UndocxResult {
            document,
            options: self.options,
            label_stem: stem,
        })
    }

    /// Parse a DOCX document from bytes.
    pub fn parse_bytes(self, data: &[u8]) -> Result<UndocxResult> {
        let parser = DocxParser::from_bytes_with_options(data, self.options.clone())?;
        let document = parser.parse()?;
        Ok(UndocxResult {
            document,
            options: self.options,
            label_stem: "table".to_string(),
        })
    }
}

impl Default for Undocx {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a DOCX document.
pub struct UndocxResult {
    /// The parsed document
    pub document: Document,
    options: ParseOptions,
    label_stem: String,
}

impl UndocxResult {
    /// Extract one record per table.
    pub fn records(&self) -> Vec<TableRecord> {
        let extractor = TableExtractor::new(self.options.clone());
        extractor.extract(&self.document, |i| format!("{}.{}", self.label_stem, i))
    }

    /// Extract records, scoring context candidates with a ranker.
    pub fn records_ranked(&self, ranker: &dyn ContextRanker) -> Vec<TableRecord> {
        let extractor = TableExtractor::new(self.options.clone()).with_ranker(ranker);
        extractor.extract(&self.document, |i| format!("{}.{}", self.label_stem, i))
    }

    /// Serialize the parsed document to JSON.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        render::to_json(&self.document, format)
    }

    /// Paragraph text of the document.
    pub fn plain_text(&self) -> String {
        self.document.plain_text()
    }

    /// Get the document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
