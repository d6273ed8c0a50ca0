//! Rendering of table records and documents to output formats.

mod json;
mod text;

pub use json::{to_json, JsonFormat};
pub use text::{document_to_text, to_text};
