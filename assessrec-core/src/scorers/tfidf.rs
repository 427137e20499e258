//! TF-IDF cosine similarity over unigram and bigram terms.
//!
//! Stands in for an embedding model: scores are cosine similarities of
//! L2-normalized, non-negative vectors, so they always fall in `[0, 1]` and
//! are comparable across queries.

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::source::ScoreSource;
use crate::types::{ScoredCandidate, SourceKind};

use super::text::semantic_terms;
use super::{to_candidates, top_scores};

/// Default vocabulary cap.
pub const DEFAULT_MAX_FEATURES: usize = 1000;

/// Sparse vector: `(term index, weight)` pairs.
type SparseVector = Vec<(usize, f64)>;

/// Semantic score source.
#[derive(Debug)]
pub struct SemanticScorer {
    catalog: Arc<Catalog>,
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    documents: Vec<SparseVector>,
}

impl SemanticScorer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_max_features(catalog, DEFAULT_MAX_FEATURES)
    }

    /// Build the index, keeping the `max_features` terms with the highest
    /// corpus frequency.
    pub fn with_max_features(catalog: Arc<Catalog>, max_features: usize) -> Self {
        let doc_terms: Vec<Vec<String>> = catalog
            .iter()
            .map(|item| semantic_terms(&item.search_text))
            .collect();

        let mut corpus_freq: HashMap<&str, usize> = HashMap::new();
        let mut doc_freq: HashMap<&str, usize> = HashMap::new();
        for terms in &doc_terms {
            let mut seen: Vec<&str> = Vec::new();
            for term in terms {
                *corpus_freq.entry(term.as_str()).or_insert(0) += 1;
                if !seen.contains(&term.as_str()) {
                    seen.push(term.as_str());
                }
            }
            for term in seen {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(&str, usize)> = corpus_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(max_features);
        let mut kept: Vec<&str> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort_unstable();

        let n = doc_terms.len() as f64;
        let idf: Vec<f64> = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n) / (1.0 + df)).ln() + 1.0
            })
            .collect();
        let vocabulary: HashMap<String, usize> = kept
            .iter()
            .enumerate()
            .map(|(i, term)| ((*term).to_string(), i))
            .collect();

        let documents: Vec<SparseVector> = doc_terms
            .iter()
            .map(|terms| vectorize(terms, &vocabulary, &idf))
            .collect();

        tracing::debug!(
            documents = documents.len(),
            features = vocabulary.len(),
            "built semantic index"
        );

        Self {
            catalog,
            vocabulary,
            idf,
            documents,
        }
    }

    pub fn vocabulary_len(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn has_term(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// Cosine similarity of every document to `query`, in corpus order.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let query_vector: HashMap<usize, f64> =
            vectorize(&semantic_terms(query), &self.vocabulary, &self.idf)
                .into_iter()
                .collect();
        if query_vector.is_empty() {
            return vec![0.0; self.documents.len()];
        }
        self.documents
            .iter()
            .map(|doc| {
                let dot: f64 = doc
                    .iter()
                    .filter_map(|(i, w)| query_vector.get(i).map(|q| q * w))
                    .sum();
                dot.clamp(0.0, 1.0)
            })
            .collect()
    }
}

/// Raw term counts weighted by idf, then L2-normalized. Out-of-vocabulary
/// terms are ignored.
fn vectorize(terms: &[String], vocabulary: &HashMap<String, usize>, idf: &[f64]) -> SparseVector {
    let mut counts: HashMap<usize, f64> = HashMap::new();
    for term in terms {
        if let Some(&index) = vocabulary.get(term) {
            *counts.entry(index).or_insert(0.0) += 1.0;
        }
    }
    let mut vector: SparseVector = counts
        .into_iter()
        .map(|(index, tf)| (index, tf * idf[index]))
        .collect();
    let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
    if norm > 0.0 {
        for (_, w) in &mut vector {
            *w /= norm;
        }
    }
    vector.sort_unstable_by_key(|(index, _)| *index);
    vector
}

impl ScoreSource for SemanticScorer {
    fn score(&self, query: &str, limit: usize) -> Result<Vec<ScoredCandidate<'_>>, RecommendError> {
        let ranked = top_scores(&self.scores(query), limit);
        Ok(to_candidates(&self.catalog, ranked, SourceKind::Semantic))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Semantic
    }

    fn name(&self) -> &str {
        "tfidf"
    }
}
