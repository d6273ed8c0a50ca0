//! Document model types for DOCX content representation.
//!
//! This module defines the intermediate representation that bridges
//! container parsing and table extraction: an ordered stream of paragraphs
//! and raw tables, plus the serializable per-table output record.

mod document;
mod paragraph;
mod table;

pub use document::{Document, Item, Metadata, RawTable};
pub use paragraph::Paragraph;
pub use table::{ScoredContext, TableKind, TableRecord};
