//! Trait definition for pluggable relevance score sources.
//!
//! The pipeline consumes exactly two sources, one semantic and one lexical.
//! Each implements [`ScoreSource`] over a shared, read-only catalog.

use crate::error::RecommendError;
use crate::types::{ScoredCandidate, SourceKind};

/// A relevance scorer over a fixed catalog snapshot.
///
/// Implementors hold whatever index they need, built once at startup.
/// Scoring must not mutate shared state, so concurrent queries can share a
/// single instance.
pub trait ScoreSource: Send + Sync {
    /// Score the catalog against `query` and return at most `limit`
    /// candidates, best first.
    ///
    /// Ties must be broken by catalog order so that output is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::Source`] if the source cannot score the
    /// query. The pipeline treats an error like an empty result.
    fn score(&self, query: &str, limit: usize)
        -> Result<Vec<ScoredCandidate<'_>>, RecommendError>;

    /// Which kind of score this source produces.
    fn kind(&self) -> SourceKind;

    /// Short name for logs.
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CatalogItem, Category};

    /// A source that returns its items in order with descending scores.
    struct MockSource {
        items: Vec<CatalogItem>,
        fail: bool,
    }

    impl ScoreSource for MockSource {
        fn score(
            &self,
            _query: &str,
            limit: usize,
        ) -> Result<Vec<ScoredCandidate<'_>>, RecommendError> {
            if self.fail {
                return Err(RecommendError::Source("mock source failure".into()));
            }
            Ok(self
                .items
                .iter()
                .take(limit)
                .enumerate()
                .map(|(i, item)| ScoredCandidate {
                    item,
                    score: 1.0 / (1.0 + i as f64),
                    source: self.kind(),
                })
                .collect())
        }

        fn kind(&self) -> SourceKind {
            SourceKind::Lexical
        }

        fn name(&self) -> &str {
            "mock"
        }
    }

    fn item(url: &str) -> CatalogItem {
        CatalogItem {
            url: url.into(),
            name: url.into(),
            description: String::new(),
            category: Category::Knowledge,
            section: String::new(),
            duration: None,
            skills: vec![],
            search_text: String::new(),
        }
    }

    #[test]
    fn mock_source_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MockSource>();
    }

    #[test]
    fn mock_source_respects_limit() {
        let source = MockSource {
            items: vec![item("a"), item("b"), item("c")],
            fail: false,
        };
        let scored = source.score("q", 2).expect("should succeed");
        assert_eq!(scored.len(), 2);
        assert_eq!(scored[0].item.url, "a");
        assert_eq!(scored[1].source, SourceKind::Lexical);
    }

    #[test]
    fn mock_source_propagates_errors() {
        let source = MockSource {
            items: vec![],
            fail: true,
        };
        let err = source.score("q", 5).unwrap_err();
        assert!(err.to_string().contains("mock source failure"));
    }

    #[test]
    fn trait_is_object_safe() {
        let source: Box<dyn ScoreSource> = Box::new(MockSource {
            items: vec![item("a")],
            fail: false,
        });
        assert_eq!(source.name(), "mock");
    }
}
