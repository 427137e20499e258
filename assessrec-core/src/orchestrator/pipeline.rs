//! Per-query recommendation pipeline: score, fuse, classify, allocate.
//!
//! Both score sources run against the same read-only catalog. A failing
//! source is logged and treated as empty; a failing classifier is logged
//! and replaced by the fallback category set. The pipeline itself never
//! fails a query.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::classifier::CategoryClassifier;
use crate::config::RetrievalConfig;
use crate::error::RecommendError;
use crate::source::ScoreSource;
use crate::types::{FusedCandidate, Recommendation, RequiredCategories, ScoredCandidate, SourceKind};

use super::allocate::allocate;
use super::fusion::fuse;

/// The recommendation pipeline over one catalog snapshot.
///
/// Holds no per-query state, so a single instance behind an [`Arc`] serves
/// concurrent queries.
pub struct Recommender<C> {
    catalog: Arc<Catalog>,
    semantic: Arc<dyn ScoreSource>,
    lexical: Arc<dyn ScoreSource>,
    classifier: C,
    config: RetrievalConfig,
}

impl<C> std::fmt::Debug for Recommender<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recommender")
            .field("catalog_len", &self.catalog.len())
            .field("semantic", &self.semantic.name())
            .field("lexical", &self.lexical.name())
            .field("config", &self.config)
            .finish()
    }
}

impl<C: CategoryClassifier> Recommender<C> {
    /// Assemble a pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::Config`] if `config` is invalid or a source
    /// is wired into the wrong slot.
    pub fn new(
        catalog: Arc<Catalog>,
        semantic: Arc<dyn ScoreSource>,
        lexical: Arc<dyn ScoreSource>,
        classifier: C,
        config: RetrievalConfig,
    ) -> Result<Self, RecommendError> {
        config.validate()?;
        if semantic.kind() != SourceKind::Semantic {
            return Err(RecommendError::Config(format!(
                "semantic slot holds a {} source",
                semantic.kind()
            )));
        }
        if lexical.kind() != SourceKind::Lexical {
            return Err(RecommendError::Config(format!(
                "lexical slot holds a {} source",
                lexical.kind()
            )));
        }
        Ok(Self {
            catalog,
            semantic,
            lexical,
            classifier,
            config,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    /// Score `query` with both sources and fuse the results into the
    /// candidate pool.
    pub fn retrieve(&self, query: &str) -> Vec<FusedCandidate<'_>> {
        let depth = self.config.source_depth();
        let semantic = collect_scores(self.semantic.as_ref(), query, depth);
        let lexical = collect_scores(self.lexical.as_ref(), query, depth);
        let pool = fuse(
            &semantic,
            &lexical,
            self.config.semantic_weight,
            self.config.lexical_weight,
            self.config.pool_size,
        );
        tracing::debug!(
            semantic = semantic.len(),
            lexical = lexical.len(),
            pool = pool.len(),
            "fused candidate pool"
        );
        pool
    }

    /// Ask the classifier which categories `query` needs, falling back to
    /// the configured set when it is unavailable or answers with nothing.
    pub async fn required_categories(&self, query: &str) -> RequiredCategories {
        match self.classifier.classify(query).await {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => {
                tracing::warn!(
                    classifier = self.classifier.name(),
                    "classifier returned no categories, using fallback"
                );
                self.config.fallback()
            }
            Err(err) => {
                tracing::warn!(
                    classifier = self.classifier.name(),
                    error = %err,
                    "classifier unavailable, using fallback"
                );
                self.config.fallback()
            }
        }
    }

    /// Run the full pipeline and return the final candidates in rank order.
    pub async fn rank(&self, query: &str, top_k: usize) -> Vec<FusedCandidate<'_>> {
        let pool = self.retrieve(query);
        if pool.is_empty() || top_k == 0 {
            return Vec::new();
        }
        let categories = self.required_categories(query).await;
        balance(&pool, &categories, top_k)
    }

    /// Like [`rank`](Self::rank), allocating for `categories` instead of
    /// asking the classifier.
    pub fn rank_with(
        &self,
        query: &str,
        top_k: usize,
        categories: &RequiredCategories,
    ) -> Vec<FusedCandidate<'_>> {
        let pool = self.retrieve(query);
        if pool.is_empty() || top_k == 0 {
            return Vec::new();
        }
        balance(&pool, categories, top_k)
    }

    /// Run the full pipeline and project the results for output.
    pub async fn recommend(&self, query: &str, top_k: usize) -> Vec<Recommendation> {
        self.rank(query, top_k)
            .await
            .iter()
            .map(Recommendation::from)
            .collect()
    }

    /// Project [`rank_with`](Self::rank_with) for output.
    pub fn recommend_with(
        &self,
        query: &str,
        top_k: usize,
        categories: &RequiredCategories,
    ) -> Vec<Recommendation> {
        self.rank_with(query, top_k, categories)
            .iter()
            .map(Recommendation::from)
            .collect()
    }
}

fn balance<'a>(
    pool: &[FusedCandidate<'a>],
    categories: &RequiredCategories,
    top_k: usize,
) -> Vec<FusedCandidate<'a>> {
    let ranked = allocate(pool, categories, top_k);
    tracing::debug!(
        %categories,
        top_k,
        results = ranked.len(),
        "allocated recommendations"
    );
    ranked
}

/// Score with one source, degrading any failure to an empty list.
fn collect_scores<'s>(
    source: &'s dyn ScoreSource,
    query: &str,
    depth: usize,
) -> Vec<ScoredCandidate<'s>> {
    match source.score(query, depth) {
        Ok(scores) => {
            tracing::trace!(source = source.name(), count = scores.len(), "source returned scores");
            scores
        }
        Err(err) => {
            tracing::warn!(source = source.name(), error = %err, "score source failed");
            Vec::new()
        }
    }
}
