//! # assessrec-core
//!
//! Hybrid retrieval and category-balanced reranking for assessment
//! recommendation.
//!
//! A free-text hiring query is scored by two independent sources over a
//! read-only catalog, the two lists are fused into one ranked pool, and a
//! fixed result budget is spread across the assessment categories the query
//! needs.
//!
//! ## Design
//!
//! - Lexical relevance from Okapi BM25, semantic similarity from TF-IDF cosine
//! - Lexical scores are normalized per batch; semantic scores are used as-is
//! - Fusion is a weighted sum with deterministic tie-breaking
//! - Allocation fills a per-category quota in fused order, then backfills
//! - Graceful degradation: a failed source counts as empty, a failed
//!   classifier falls back to a configured category set
//!
//! ## Security
//!
//! - No network access; classifier backends live in the service crate
//! - Queries are logged only at debug or trace level

pub mod catalog;
pub mod classifier;
pub mod config;
pub mod error;
pub mod eval;
pub mod orchestrator;
pub mod scorers;
pub mod source;
pub mod types;

pub use catalog::{Catalog, RawRecord};
pub use classifier::{CategoryClassifier, FixedClassifier, UnavailableClassifier};
pub use config::RetrievalConfig;
pub use error::{RecommendError, Result};
pub use orchestrator::Recommender;
pub use scorers::{LexicalScorer, SemanticScorer};
pub use source::ScoreSource;
pub use types::{CatalogItem, Category, FusedCandidate, Recommendation, RequiredCategories, SourceKind};

use std::sync::Arc;

/// Build a recommender over `catalog` with the default BM25 and TF-IDF
/// score sources.
///
/// # Errors
///
/// Returns [`RecommendError::Config`] if `config` fails validation.
///
/// # Examples
///
/// ```
/// # async fn example() -> assessrec_core::Result<()> {
/// use std::sync::Arc;
/// use assessrec_core::{Catalog, FixedClassifier, RequiredCategories, RetrievalConfig};
///
/// let catalog = Arc::new(Catalog::parse_json(
///     r#"[{"url": "https://x.test/java", "name": "Java 8", "test_type": "K"}]"#,
/// )?);
/// let recommender = assessrec_core::build_recommender(
///     catalog,
///     FixedClassifier::new(RequiredCategories::fallback()),
///     RetrievalConfig::default(),
/// )?;
/// for rec in recommender.recommend("java developer", 10).await {
///     println!("{} {}", rec.assessment_name, rec.assessment_url);
/// }
/// # Ok(())
/// # }
/// ```
pub fn build_recommender<C: CategoryClassifier>(
    catalog: Arc<Catalog>,
    classifier: C,
    config: RetrievalConfig,
) -> Result<Recommender<C>> {
    let semantic: Arc<dyn ScoreSource> = Arc::new(SemanticScorer::new(Arc::clone(&catalog)));
    let lexical: Arc<dyn ScoreSource> = Arc::new(LexicalScorer::new(Arc::clone(&catalog)));
    Recommender::new(catalog, semantic, lexical, classifier, config)
}
