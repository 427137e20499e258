//! Okapi BM25 keyword relevance over catalog search text.

use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::source::ScoreSource;
use crate::types::{ScoredCandidate, SourceKind};

use super::text::tokenize;
use super::{to_candidates, top_scores};

/// BM25 tuning constants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f64,
    /// Document length normalization.
    pub b: f64,
    /// Floor applied to negative idf values, as a fraction of mean idf.
    pub epsilon: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.5,
            b: 0.75,
            epsilon: 0.25,
        }
    }
}

/// Lexical score source. Scores are unbounded and only comparable within a
/// single query.
#[derive(Debug)]
pub struct LexicalScorer {
    catalog: Arc<Catalog>,
    params: Bm25Params,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f64,
    idf: HashMap<String, f64>,
}

impl LexicalScorer {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_params(catalog, Bm25Params::default())
    }

    /// Build the index over every item's `search_text`.
    pub fn with_params(catalog: Arc<Catalog>, params: Bm25Params) -> Self {
        let mut term_freqs = Vec::with_capacity(catalog.len());
        let mut doc_lens = Vec::with_capacity(catalog.len());
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();

        for item in catalog.iter() {
            let tokens = tokenize(&item.search_text);
            doc_lens.push(tokens.len());
            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_freqs.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
        }

        let total_len: usize = doc_lens.iter().sum();
        let avg_doc_len = if doc_lens.is_empty() {
            0.0
        } else {
            total_len as f64 / doc_lens.len() as f64
        };
        let idf = compute_idf(&doc_freqs, doc_lens.len(), params.epsilon);

        tracing::debug!(
            documents = doc_lens.len(),
            terms = idf.len(),
            avg_doc_len,
            "built lexical index"
        );

        Self {
            catalog,
            params,
            term_freqs,
            doc_lens,
            avg_doc_len,
            idf,
        }
    }

    /// BM25 score of every document for `query`, in corpus order.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let query_terms = tokenize(query);
        let Bm25Params { k1, b, .. } = self.params;
        let avg = if self.avg_doc_len > 0.0 {
            self.avg_doc_len
        } else {
            1.0
        };

        self.term_freqs
            .iter()
            .zip(&self.doc_lens)
            .map(|(freqs, &len)| {
                let norm = k1 * (1.0 - b + b * len as f64 / avg);
                query_terms
                    .iter()
                    .map(|term| {
                        let tf = f64::from(freqs.get(term).copied().unwrap_or(0));
                        let idf = self.idf.get(term).copied().unwrap_or(0.0);
                        idf * (tf * (k1 + 1.0)) / (tf + norm)
                    })
                    .sum()
            })
            .collect()
    }
}

/// `ln(N - df + 0.5) - ln(df + 0.5)`, with negative values lifted to
/// `epsilon * mean_idf`.
fn compute_idf(doc_freqs: &HashMap<String, u32>, docs: usize, epsilon: f64) -> HashMap<String, f64> {
    let n = docs as f64;
    let mut idf: HashMap<String, f64> = doc_freqs
        .iter()
        .map(|(term, &df)| {
            let df = f64::from(df);
            (term.clone(), (n - df + 0.5).ln() - (df + 0.5).ln())
        })
        .collect();
    if idf.is_empty() {
        return idf;
    }
    let mean = idf.values().sum::<f64>() / idf.len() as f64;
    let floor = epsilon * mean;
    for value in idf.values_mut() {
        if *value < 0.0 {
            *value = floor;
        }
    }
    idf
}

impl ScoreSource for LexicalScorer {
    fn score(&self, query: &str, limit: usize) -> Result<Vec<ScoredCandidate<'_>>, RecommendError> {
        let ranked = top_scores(&self.scores(query), limit);
        Ok(to_candidates(&self.catalog, ranked, SourceKind::Lexical))
    }

    fn kind(&self) -> SourceKind {
        SourceKind::Lexical
    }

    fn name(&self) -> &str {
        "bm25"
    }
}
