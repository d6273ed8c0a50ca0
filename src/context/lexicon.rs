//! Keyword stems and compiled patterns shared by the context heuristics.
//!
//! The source corpus is bilingual: Russian construction-standard documents
//! with occasional English captions, so every keyword stem carries both
//! forms. All patterns are compiled once inside [`Lexicon`] and the struct
//! is shared immutably across the extraction run.

use regex::Regex;

/// Stems marking a table caption ("Таблица 5.2", "Table 3").
pub const TABLE_STEMS: [&str; 2] = ["табл", "table"];

/// Stems marking a fill-in form caption. Matched with a leading space in
/// reference detection to avoid prefix collisions ("inform", "платформа").
pub const FORM_STEMS: [&str; 2] = ["форм", "form"];

/// Stems marking an appendix heading ("Приложение Б", "Appendix B").
pub const APPENDIX_STEMS: [&str; 2] = ["приложен", "appendix"];

/// Stems marking a bibliography section.
pub const BIBLIOGRAPHY_STEMS: [&str; 2] = ["библиограф", "bibliograph"];

/// Compiled patterns for identifier and reference matching.
pub struct Lexicon {
    whitespace: Regex,
    id_candidate: Regex,
    letter_id: Regex,
    application_id: Regex,
    external_citation: Regex,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexicon {
    /// Compile the pattern set.
    pub fn new() -> Self {
        Self {
            whitespace: Regex::new(r"\s+").unwrap(),
            // Identifier alphabet: Cyrillic and Latin letters, digits, dot.
            id_candidate: Regex::new(r"[0-9A-Za-zА-Яа-яЁё.]+").unwrap(),
            // A standalone uppercase-letter token ("Б", "B").
            letter_id: Regex::new(r"\b[A-ZА-ЯЁ]+\b").unwrap(),
            // Single-uppercase-letter-prefix identifier ("Б.1", "B.1.2").
            application_id: Regex::new(r"^[A-ZА-ЯЁ]\.[0-9]+(?:\.[0-9]+)*$").unwrap(),
            // Trailing cross-document citation of an external standard
            // ("... СП 63" / "... SP 20"), excluded from references.
            external_citation: Regex::new(r"(?i)\b(?:сп|sp)\s*[0-9]+\s*\.?\s*$").unwrap(),
        }
    }

    /// Collapse internal whitespace runs to single spaces and trim.
    pub fn normalize_spaces(&self, text: &str) -> String {
        self.whitespace.replace_all(text.trim(), " ").to_string()
    }

    /// Lower-cased, whitespace-normalized, punctuation-trimmed matching key.
    pub fn normalized_key(&self, text: &str) -> String {
        let collapsed = self.normalize_spaces(text).to_lowercase();
        collapsed
            .trim_matches(|c: char| c.is_ascii_punctuation() || c == '«' || c == '»')
            .to_string()
    }

    /// Whether the normalized key starts with any of the given stems.
    pub fn starts_with_stem(&self, key: &str, stems: &[&str]) -> bool {
        stems.iter().any(|stem| key.starts_with(stem))
    }

    /// Whether the normalized key contains any of the given stems.
    pub fn contains_stem(&self, key: &str, stems: &[&str]) -> bool {
        stems.iter().any(|stem| key.contains(stem))
    }

    /// Whether the key contains a form stem preceded by a space (word
    /// boundary guard against prefix collisions).
    pub fn contains_spaced_form_stem(&self, key: &str) -> bool {
        FORM_STEMS
            .iter()
            .any(|stem| key.contains(&format!(" {}", stem)))
    }

    /// Extract the best identifier candidate from a caption paragraph.
    ///
    /// Candidates over the identifier alphabet must carry a digit; among
    /// them a later candidate wins when its dot count is not fewer than the
    /// current best, so dotted identifiers like "Б.1.2" beat a bare "1".
    pub fn extract_id(&self, text: &str) -> Option<String> {
        let mut best: Option<String> = None;

        for candidate in self.id_candidate.find_iter(text) {
            let trimmed = candidate.as_str().trim_matches('.');
            if trimmed.is_empty() || !trimmed.chars().any(|c| c.is_ascii_digit()) {
                continue;
            }

            let dots = trimmed.matches('.').count();
            let best_dots = best.as_deref().map(|b| b.matches('.').count());
            if best_dots.map_or(true, |d| dots >= d) {
                best = Some(trimmed.to_string());
            }
        }

        best
    }

    /// Extract an appendix identifier: the first standalone uppercase
    /// letter token in the text ("Приложение Б" yields "Б").
    pub fn extract_letter_id(&self, text: &str) -> Option<String> {
        self.letter_id
            .find_iter(text)
            .map(|m| m.as_str().to_string())
            .find(|token| token.chars().all(|c| c.is_uppercase()))
    }

    /// Whether an id matches the single-uppercase-letter-prefix pattern
    /// ("Б.1", "B.1.2").
    pub fn is_application_id(&self, id: &str) -> bool {
        self.application_id.is_match(id)
    }

    /// Whether an id is a bare appendix letter ("Б", "B").
    pub fn is_bare_letter_id(&self, id: &str) -> bool {
        let mut chars = id.chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase() && c.is_alphabetic())
    }

    /// The single-letter application prefix of an id, if it has one.
    pub fn application_prefix(&self, id: &str) -> Option<char> {
        if self.is_application_id(id) || self.is_bare_letter_id(id) {
            id.chars().next()
        } else {
            None
        }
    }

    /// Whether the text ends in an external cross-document citation
    /// ("... СП 63.13330"), which never counts as a table reference.
    pub fn has_external_citation(&self, text: &str) -> bool {
        self.external_citation.is_match(text)
    }
}
