//! Context window assembly.
//!
//! Walks the paragraph stream backward from a table's document position.
//! The classifier consumes the head of the walk to establish id/title/kind,
//! then every remaining non-blank paragraph is tested with the reference
//! detector. From the first hit onward paragraphs are collected until the
//! window budget runs out, reversed back into document order and joined
//! with blank-line separators.

use super::classify::{Classification, Classifier};
use super::lexicon::Lexicon;
use super::reference::ReferenceDetector;
use crate::model::{Document, Item, Paragraph};

/// Default number of context paragraphs harvested per table.
pub const DEFAULT_CONTEXT_WINDOW: usize = 5;

/// Separator between joined context paragraphs.
const PARAGRAPH_SEP: &str = "\n\n";

/// Assembled context for one table.
#[derive(Debug, Clone, Default)]
pub struct TableContext {
    /// Classification outcome (id, title, kind)
    pub classification: Classification,

    /// Joined context text in document order, if any reference was found
    pub context: Option<String>,

    /// Positions of the harvested context paragraphs, document order
    pub paragraphs: Vec<usize>,
}

/// Walks paragraphs around a table and harvests its explanatory context.
pub struct ContextAssembler<'a> {
    lexicon: &'a Lexicon,
    window_size: usize,
}

impl<'a> ContextAssembler<'a> {
    /// Create an assembler with the given window budget.
    pub fn new(lexicon: &'a Lexicon, window_size: usize) -> Self {
        Self {
            lexicon,
            window_size,
        }
    }

    /// Assemble the context for the table at item position `table_pos`.
    ///
    /// Never fails: a table with no establishable id is reported with a
    /// null id/title/context.
    pub fn assemble(&self, document: &Document, table_pos: usize) -> TableContext {
        // Nearest-to-farthest backward walk over the preceding paragraphs.
        let walk: Vec<&Paragraph> = document.items[..table_pos.min(document.items.len())]
            .iter()
            .rev()
            .filter_map(|item| match item {
                Item::Paragraph(p) => Some(p),
                Item::Table(_) => None,
            })
            .collect();

        let classification = Classifier::new(self.lexicon).classify(&walk);

        if classification.id.is_none() {
            return TableContext {
                classification,
                context: None,
                paragraphs: Vec::new(),
            };
        }

        let detector = ReferenceDetector::new(self.lexicon);
        let id = classification.id.as_deref();
        let kind = classification.kind;

        let mut found_reference = false;
        let mut remaining_budget = self.window_size;
        let mut collected: Vec<&Paragraph> = Vec::new();

        for paragraph in walk.iter().skip(classification.consumed) {
            if remaining_budget == 0 {
                break;
            }
            if paragraph.is_empty() {
                continue;
            }

            if !found_reference {
                if detector.has_reference(&paragraph.text, id, kind) {
                    found_reference = true;
                } else {
                    continue;
                }
            }

            collected.push(paragraph);
            remaining_budget -= 1;
        }

        // Restore document order before joining.
        collected.reverse();

        let context = if collected.is_empty() {
            None
        } else {
            let joined = collected
                .iter()
                .map(|p| self.lexicon.normalize_spaces(&p.text))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(PARAGRAPH_SEP);
            Some(joined)
        };

        TableContext {
            paragraphs: collected.iter().map(|p| p.position).collect(),
            classification,
            context,
        }
    }
}
