//! Offline evaluation with mean Recall@K.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::classifier::CategoryClassifier;
use crate::orchestrator::pipeline::Recommender;

/// One labeled row: a query and one assessment judged relevant for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledRow {
    pub query: String,
    pub assessment_url: String,
}

/// A query with every URL labeled relevant for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledQuery {
    pub query: String,
    pub relevant: Vec<String>,
}

/// Group rows by query, keeping the order in which queries first appear.
/// Blank queries and URLs are skipped, and repeated URLs are kept once.
pub fn group_by_query(rows: impl IntoIterator<Item = LabeledRow>) -> Vec<LabeledQuery> {
    let mut grouped: Vec<LabeledQuery> = Vec::new();
    for row in rows {
        let query = row.query.trim();
        let url = row.assessment_url.trim();
        if query.is_empty() || url.is_empty() {
            continue;
        }
        let entry = match grouped.iter_mut().position(|g| g.query == query) {
            Some(i) => &mut grouped[i],
            None => {
                grouped.push(LabeledQuery {
                    query: query.to_string(),
                    relevant: Vec::new(),
                });
                let last = grouped.len() - 1;
                &mut grouped[last]
            }
        };
        if !entry.relevant.iter().any(|u| u == url) {
            entry.relevant.push(url.to_string());
        }
    }
    grouped
}

/// Fraction of `relevant` found among the first `k` of `predicted`.
///
/// Returns 0 when `relevant` is empty.
pub fn recall_at_k<S: AsRef<str>, R: AsRef<str>>(predicted: &[S], relevant: &[R], k: usize) -> f64 {
    let relevant: HashSet<&str> = relevant.iter().map(|s| s.as_ref()).collect();
    if relevant.is_empty() {
        return 0.0;
    }
    let hits: HashSet<&str> = predicted
        .iter()
        .take(k)
        .map(|s| s.as_ref())
        .filter(|url| relevant.contains(url))
        .collect();
    hits.len() as f64 / relevant.len() as f64
}

/// Per-query evaluation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub query: String,
    pub recall: f64,
    pub predicted: Vec<String>,
    pub relevant: Vec<String>,
}

/// Aggregate evaluation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub mean_recall_at_k: f64,
    pub k: usize,
    pub num_queries: usize,
    pub per_query_results: Vec<QueryResult>,
}

/// Run every labeled query through `recommender` and score Recall@`k`.
pub async fn evaluate<C: CategoryClassifier>(
    recommender: &Recommender<C>,
    labeled: &[LabeledQuery],
    k: usize,
) -> EvaluationReport {
    let mut per_query_results = Vec::with_capacity(labeled.len());
    for labeled_query in labeled {
        let predicted: Vec<String> = recommender
            .recommend(&labeled_query.query, k)
            .await
            .into_iter()
            .map(|r| r.assessment_url)
            .collect();
        let recall = recall_at_k(predicted.as_slice(), labeled_query.relevant.as_slice(), k);
        tracing::debug!(recall, relevant = labeled_query.relevant.len(), "evaluated query");
        per_query_results.push(QueryResult {
            query: labeled_query.query.clone(),
            recall,
            predicted,
            relevant: labeled_query.relevant.clone(),
        });
    }

    let num_queries = per_query_results.len();
    let mean_recall_at_k = if num_queries == 0 {
        0.0
    } else {
        per_query_results.iter().map(|r| r.recall).sum::<f64>() / num_queries as f64
    };
    tracing::info!(num_queries, k, mean_recall_at_k, "evaluation finished");

    EvaluationReport {
        mean_recall_at_k,
        k,
        num_queries,
        per_query_results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(query: &str, url: &str) -> LabeledRow {
        LabeledRow {
            query: query.into(),
            assessment_url: url.into(),
        }
    }

    #[test]
    fn recall_counts_hits_within_k() {
        let predicted = ["a", "b", "c", "d"];
        assert!((recall_at_k(&predicted, &["a", "d"], 3) - 0.5).abs() < f64::EPSILON);
        assert!((recall_at_k(&predicted, &["a", "d"], 4) - 1.0).abs() < f64::EPSILON);
        assert!(recall_at_k(&predicted, &["z"], 4).abs() < f64::EPSILON);
    }

    #[test]
    fn recall_with_no_relevant_is_zero() {
        let none: [&str; 0] = [];
        assert!(recall_at_k(&["a"], &none, 10).abs() < f64::EPSILON);
    }

    #[test]
    fn recall_ignores_repeated_predictions() {
        assert!((recall_at_k(&["a", "a"], &["a", "b"], 2) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn grouping_keeps_first_seen_order() {
        let grouped = group_by_query(vec![
            row("q2", "u1"),
            row("q1", "u2"),
            row("q2", "u3"),
            row("q2", "u1"),
            row("  ", "u4"),
            row("q1", ""),
        ]);
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].query, "q2");
        assert_eq!(grouped[0].relevant, vec!["u1", "u3"]);
        assert_eq!(grouped[1].relevant, vec!["u2"]);
    }
}
