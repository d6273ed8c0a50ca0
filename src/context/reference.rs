//! Textual reference detection.
//!
//! Decides whether a paragraph refers to a table with a known identifier.
//! The hard part is partial-identifier collisions: "5.2" must match inside
//! "по таблице 5.2." but never inside "5.23" or inside an unrelated longer
//! token, so literal matches are accepted only when bounded by the right
//! character classes on both sides and anchored by a caption-stem token
//! immediately before the id.

use super::lexicon::{Lexicon, APPENDIX_STEMS, FORM_STEMS, TABLE_STEMS};
use crate::model::TableKind;

/// Characters allowed immediately left of a literal id match.
fn is_left_bound(c: char) -> bool {
    c.is_whitespace() || matches!(c, '(' | '[' | '{' | '«')
}

/// Characters allowed immediately right of a literal id match.
fn is_right_bound(c: char) -> bool {
    c.is_whitespace() || matches!(c, ')' | ']' | '}' | '»' | '.' | ',' | ';' | ':' | '!' | '?')
}

/// Reference detector for one table's id/kind.
pub struct ReferenceDetector<'a> {
    lexicon: &'a Lexicon,
}

impl<'a> ReferenceDetector<'a> {
    /// Create a detector over a compiled lexicon.
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self { lexicon }
    }

    /// Whether `text` references the table identified by `id` of `kind`.
    pub fn has_reference(&self, text: &str, id: Option<&str>, kind: TableKind) -> bool {
        let lex = self.lexicon;
        let Some(id) = id else {
            return false;
        };

        let key = lex.normalized_key(text);

        // Caption paragraphs declare tables, they do not reference them.
        if lex.starts_with_stem(&key, &TABLE_STEMS) {
            return false;
        }

        let stem_present = match kind {
            TableKind::Table => lex.contains_stem(&key, &TABLE_STEMS),
            TableKind::Form => lex.contains_spaced_form_stem(&key),
            TableKind::Application => {
                lex.contains_stem(&key, &APPENDIX_STEMS) || lex.contains_stem(&key, &TABLE_STEMS)
            }
        } || (lex.is_bare_letter_id(id)
            && (lex.contains_stem(&key, &APPENDIX_STEMS) || lex.contains_stem(&key, &TABLE_STEMS)));

        if !stem_present {
            return false;
        }

        // A trailing citation of an external standard is a cross-document
        // appendix reference, not a reference to this table.
        if lex.has_external_citation(&key) {
            return false;
        }

        if self.has_bounded_id(text, id) {
            return true;
        }

        // Forms are referenced by proximity alone.
        if kind == TableKind::Form {
            return true;
        }

        // An appendix letter standing alone mid-text is an incomplete
        // forward reference to the surrounding appendix.
        if let Some(prefix) = lex.application_prefix(id) {
            if self.has_standalone_prefix(text, prefix) {
                return true;
            }
        }

        false
    }

    /// Literal id occurrence bounded by whitespace/brackets and anchored
    /// by a caption-stem token immediately before it.
    fn has_bounded_id(&self, text: &str, id: &str) -> bool {
        for (start, _) in text.match_indices(id) {
            let before = text[..start].chars().next_back();
            if !before.map_or(false, is_left_bound) {
                continue;
            }

            let end = start + id.len();
            if !text[end..].chars().next().map_or(true, is_right_bound) {
                continue;
            }

            if self.preceding_token_has_stem(&text[..start]) {
                return true;
            }
        }
        false
    }

    /// Read the token before the id back to the previous whitespace and
    /// test it for a caption stem ("таблице", "приложении", "форме").
    fn preceding_token_has_stem(&self, before: &str) -> bool {
        let token = before
            .trim_end()
            .rsplit(char::is_whitespace)
            .next()
            .unwrap_or("");
        let token = token.to_lowercase();
        let token = token.trim_matches(|c: char| c.is_ascii_punctuation() || c == '«' || c == '»');

        TABLE_STEMS
            .iter()
            .chain(APPENDIX_STEMS.iter())
            .chain(FORM_STEMS.iter())
            .any(|stem| token.starts_with(stem))
    }

    /// Whether the id's application-letter prefix appears as a standalone
    /// token somewhere before the very end of the text.
    fn has_standalone_prefix(&self, text: &str, prefix: char) -> bool {
        let trimmed = text.trim_end();
        let mut upper = [0u8; 4];
        let needle: &str = prefix.encode_utf8(&mut upper);

        for (start, matched) in trimmed.match_indices(needle) {
            let end = start + matched.len();
            let left_ok = text[..start]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric());
            let right_ok = trimmed[end..]
                .chars()
                .next()
                .map_or(true, |c| !c.is_alphanumeric() && c != '.');
            let at_end = trimmed[end..]
                .trim_end_matches(|c: char| c.is_ascii_punctuation())
                .is_empty();

            if left_ok && right_ok && !at_end {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector_true(text: &str, id: &str, kind: TableKind) -> bool {
        let lex = Lexicon::new();
        ReferenceDetector::new(&lex).has_reference(text, Some(id), kind)
    }

    #[test]
    fn test_reference_with_bounded_id() {
        assert!(detector_true(
            "Значения приведены в таблице 5.2 настоящего раздела.",
            "5.2",
            TableKind::Table
        ));
        assert!(detector_true(
            "...as shown in table 5.2.",
            "5.2",
            TableKind::Table
        ));
    }

    #[test]
    fn test_reference_rejects_longer_token() {
        // "5.2" is a substring of "5.23" and must not match.
        assert!(!detector_true(
            "...as shown in table 5.23.",
            "5.2",
            TableKind::Table
        ));
    }

    #[test]
    fn test_reference_requires_stem_token_before_id() {
        // Bounded occurrence, but the preceding token is not a caption
        // stem, so this is an unrelated number that happens to collide.
        assert!(!detector_true(
            "в таблице приведен коэффициент 5.2 для расчета",
            "5.2",
            TableKind::Table
        ));
    }

    #[test]
    fn test_reference_requires_kind_stem() {
        assert!(!detector_true(
            "См. пункт 5.2 настоящего раздела.",
            "5.2",
            TableKind::Table
        ));
    }

    #[test]
    fn test_caption_paragraph_is_not_a_reference() {
        assert!(!detector_true(
            "Таблица 5.2 — Результаты испытаний",
            "5.2",
            TableKind::Table
        ));
    }

    #[test]
    fn test_missing_id_never_matches() {
        let lex = Lexicon::new();
        let detector = ReferenceDetector::new(&lex);
        assert!(!detector.has_reference("см. таблицу 5.2", None, TableKind::Table));
    }

    #[test]
    fn test_form_matches_by_proximity() {
        assert!(detector_true(
            "Заполняется по форме, приведенной ниже.",
            "2",
            TableKind::Form
        ));
    }

    #[test]
    fn test_form_stem_requires_leading_space() {
        assert!(!detector_true(
            "Информация приведена ниже.",
            "2",
            TableKind::Form
        ));
    }

    #[test]
    fn test_application_accepts_table_stem() {
        assert!(detector_true(
            "Коэффициенты принимают по таблице Б.1.",
            "Б.1",
            TableKind::Application
        ));
    }

    #[test]
    fn test_application_standalone_prefix_mid_text() {
        assert!(detector_true(
            "Методика испытаний изложена в приложении Б настоящего свода.",
            "Б.1",
            TableKind::Application
        ));
    }

    #[test]
    fn test_application_prefix_at_end_is_incomplete() {
        assert!(!detector_true(
            "Методика испытаний изложена в приложении Б",
            "Б.1",
            TableKind::Application
        ));
    }

    #[test]
    fn test_external_citation_excluded() {
        assert!(!detector_true(
            "Нагрузки принимают по таблице 7.1 СП 20",
            "7.1",
            TableKind::Application
        ));
    }
}
