//! External scorer contract for semantic context ranking.
//!
//! The extraction core never implements semantic ranking itself; an
//! embedding-based ranker lives behind this trait and is supplied by the
//! caller. When a ranker is present the extractor queries it with the
//! table's flattened text against the document's paragraphs and emits
//! structured, score-ordered context references alongside the heuristic
//! context string.

pub use crate::model::ScoredContext;

/// Ranks candidate paragraphs against a query text.
///
/// Implementations return `(score, candidate_index)` pairs ordered by
/// descending relevance, with scores in `[0, 1]`.
pub trait ContextRanker {
    /// Rank `candidates` by relevance to `query`.
    fn rank(&self, query: &str, candidates: &[&str]) -> Vec<(f32, usize)>;
}

impl<T: ContextRanker + ?Sized> ContextRanker for &T {
    fn rank(&self, query: &str, candidates: &[&str]) -> Vec<(f32, usize)> {
        (**self).rank(query, candidates)
    }
}
