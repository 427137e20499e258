//! Score sources built over a catalog snapshot.
//!
//! Each module provides a struct implementing [`crate::source::ScoreSource`].
//! Indexes are built once at construction and only read afterwards.

pub mod bm25;
pub mod text;
pub mod tfidf;

pub use bm25::{Bm25Params, LexicalScorer};
pub use tfidf::SemanticScorer;

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::types::{ScoredCandidate, SourceKind};

/// Pick the `limit` best `(index, score)` pairs, best first.
///
/// Equal scores keep corpus order.
pub(crate) fn top_scores(scores: &[f64], limit: usize) -> Vec<(usize, f64)> {
    let mut ranked: Vec<(usize, f64)> = scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Resolve ranked corpus indices into candidates borrowed from `catalog`.
pub(crate) fn to_candidates<'a>(
    catalog: &'a Arc<Catalog>,
    ranked: Vec<(usize, f64)>,
    source: SourceKind,
) -> Vec<ScoredCandidate<'a>> {
    ranked
        .into_iter()
        .filter_map(|(index, score)| {
            catalog.get(index).map(|item| ScoredCandidate {
                item,
                score,
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_scores_orders_and_truncates() {
        let ranked = top_scores(&[0.1, 0.7, 0.7, 0.0, 0.9], 3);
        assert_eq!(ranked, vec![(4, 0.9), (1, 0.7), (2, 0.7)]);
    }

    #[test]
    fn top_scores_handles_small_inputs() {
        assert!(top_scores(&[], 5).is_empty());
        assert!(top_scores(&[1.0], 0).is_empty());
        assert_eq!(top_scores(&[0.0, 0.0], 5), vec![(0, 0.0), (1, 0.0)]);
    }
}
