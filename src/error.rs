//! Error types for the undocx library.

use std::io;
use thiserror::Error;

/// Result type alias for undocx operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during DOCX table extraction.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a DOCX container.
    #[error("Unknown file format: not a valid DOCX")]
    UnknownFormat,

    /// Error reading the ZIP container.
    #[error("Container error: {0}")]
    Container(#[from] zip::result::ZipError),

    /// A required container part is missing (e.g. word/document.xml).
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// Error parsing document XML.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// A table's physical cell layout cannot be reconciled into a grid.
    #[error("Malformed table structure: {0}")]
    MalformedTable(String),

    /// Flat-text output was requested for a non-isotropic table.
    #[error("Table is not isotropic: {0}")]
    Shape(String),

    /// Error during rendering (JSON, flat text).
    #[error("Rendering error: {0}")]
    Render(String),

    /// Encoding error.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Xml(err.to_string())
    }
}
