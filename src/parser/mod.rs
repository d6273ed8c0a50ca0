//! DOCX parsing module.

mod docx;
mod options;

pub use docx::DocxParser;
pub use options::{ErrorMode, ParseOptions};
