//! Context association heuristics.
//!
//! Given a table's position in the document, these modules determine its
//! id, title and structural kind, then harvest the preceding paragraphs
//! that explain its content.

mod classify;
mod lexicon;
mod reference;
mod window;

pub use classify::{Classification, Classifier};
pub use lexicon::Lexicon;
pub use reference::ReferenceDetector;
pub use window::{ContextAssembler, TableContext, DEFAULT_CONTEXT_WINDOW};
