//! Identifier and type classification from caption paragraphs.
//!
//! The classifier consumes the head of the backward walk from a table's
//! document position and decides the table's id, title and structural
//! kind. Rules apply first-match-wins on a lower-cased, punctuation-
//! trimmed copy of each paragraph; the extracted id and title keep the
//! original casing.

use super::lexicon::{
    Lexicon, APPENDIX_STEMS, BIBLIOGRAPHY_STEMS, FORM_STEMS, TABLE_STEMS,
};
use crate::model::{Paragraph, TableKind};

/// Separator used when a title spans several paragraphs.
pub(crate) const TITLE_SEP: &str = "\n\n";

/// Result of classifying the paragraphs near a table.
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// Document-assigned identifier ("5.2", "Б.1"), if found
    pub id: Option<String>,

    /// Title text, possibly joined from several paragraphs
    pub title: Option<String>,

    /// Structural kind
    pub kind: TableKind,

    /// Number of walk paragraphs absorbed into the id/title decision;
    /// the context assembler resumes after them
    pub consumed: usize,
}

/// At most this many non-empty caption candidates are inspected before
/// the classifier gives up; captions sit directly above their table.
const MAX_CAPTION_CANDIDATES: usize = 2;

/// Identifier and type classifier.
pub struct Classifier<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> Classifier<'a> {
    /// Create a classifier over a compiled lexicon.
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Classify a table from its walk of nearby paragraphs, ordered
    /// nearest to farthest.
    pub fn classify(&self, walk: &[&Paragraph]) -> Classification {
        let lex = self.lexicon;
        let mut non_empty_seen: Vec<usize> = Vec::new();

        for (index, paragraph) in walk.iter().enumerate() {
            if paragraph.is_empty() {
                continue;
            }
            if non_empty_seen.len() >= MAX_CAPTION_CANDIDATES {
                break;
            }
            non_empty_seen.push(index);

            let key = lex.normalized_key(&paragraph.text);

            if lex.starts_with_stem(&key, &BIBLIOGRAPHY_STEMS) {
                return Classification {
                    id: None,
                    title: Some(paragraph.text.clone()),
                    kind: TableKind::Table,
                    consumed: index + 1,
                };
            }

            if lex.starts_with_stem(&key, &TABLE_STEMS) {
                return self.classify_table_caption(walk, index, paragraph);
            }

            if lex.starts_with_stem(&key, &FORM_STEMS) {
                let (title, consumed) = self.title_with_next(walk, index, paragraph);
                return Classification {
                    id: lex.extract_id(&paragraph.text),
                    title: Some(title),
                    kind: TableKind::Form,
                    consumed,
                };
            }

            if lex.starts_with_stem(&key, &APPENDIX_STEMS) {
                let (title, consumed) = self.title_with_next(walk, index, paragraph);
                return Classification {
                    id: lex.extract_letter_id(&paragraph.text),
                    title: Some(title),
                    kind: TableKind::Application,
                    consumed,
                };
            }
        }

        // Fallback: a table with too little surrounding prose keeps its
        // nearby paragraphs verbatim as the title.
        if non_empty_seen.len() < MAX_CAPTION_CANDIDATES {
            let title = non_empty_seen
                .iter()
                .map(|&i| walk[i].text.as_str())
                .collect::<Vec<_>>()
                .join(TITLE_SEP);
            return Classification {
                id: None,
                title: (!title.is_empty()).then_some(title),
                kind: TableKind::Table,
                consumed: walk.len(),
            };
        }

        Classification::default()
    }

    /// Rule for "Таблица ..." captions: extract the id, then decide
    /// between a plain table and an appendix table by the id shape and
    /// the emphasis agreement with the preceding heading.
    fn classify_table_caption(
        &self,
        walk: &[&Paragraph],
        index: usize,
        paragraph: &Paragraph,
    ) -> Classification {
        let lex = self.lexicon;
        let id = lex.extract_id(&paragraph.text);

        let mut title = paragraph.text.clone();
        let mut kind = TableKind::Table;
        let mut consumed = index + 1;

        if id.as_deref().is_some_and(|id| lex.is_application_id(id)) {
            // "Таблица Б.1" under an appendix heading: absorb the heading
            // into the title when the emphasis signals agree.
            if let Some((next_index, heading)) = next_non_empty(walk, index + 1) {
                if emphasis(paragraph) == emphasis(heading) {
                    title.push_str(TITLE_SEP);
                    title.push_str(&heading.text);
                    kind = TableKind::Application;
                    consumed = next_index + 1;
                }
            }
        }

        Classification {
            id,
            title: Some(title),
            kind,
            consumed,
        }
    }

    /// Title spanning this paragraph plus the next non-empty one in the
    /// walk (forms and appendix headings carry a follow-up line).
    fn title_with_next(
        &self,
        walk: &[&Paragraph],
        index: usize,
        paragraph: &Paragraph,
    ) -> (String, usize) {
        match next_non_empty(walk, index + 1) {
            Some((next_index, next)) => (
                format!("{}{}{}", paragraph.text, TITLE_SEP, next.text),
                next_index + 1,
            ),
            None => (paragraph.text.clone(), index + 1),
        }
    }
}

fn next_non_empty<'p>(walk: &[&'p Paragraph], from: usize) -> Option<(usize, &'p Paragraph)> {
    walk.iter()
        .enumerate()
        .skip(from)
        .find(|(_, p)| !p.is_empty())
        .map(|(i, p)| (i, *p))
}

fn emphasis(paragraph: &Paragraph) -> bool {
    paragraph.bold || paragraph.is_heading()
}
