//! Query classification into required assessment categories.
//!
//! The pipeline asks a [`CategoryClassifier`] which categories a query
//! needs. Any failure, or an empty answer, makes the pipeline use the
//! configured fallback set instead.

use crate::error::RecommendError;
use crate::types::RequiredCategories;

/// Maps a query to an ordered set of required categories.
///
/// All implementations must be `Send + Sync` so one instance can serve
/// concurrent queries.
pub trait CategoryClassifier: Send + Sync {
    /// Classify `query`.
    ///
    /// # Errors
    ///
    /// Returns [`RecommendError::Classifier`] when the backing service is
    /// unavailable or its answer cannot be interpreted.
    fn classify(
        &self,
        query: &str,
    ) -> impl std::future::Future<Output = Result<RequiredCategories, RecommendError>> + Send;

    /// Short name for logs.
    fn name(&self) -> &str;
}

/// A classifier that returns the same set for every query.
#[derive(Debug, Clone)]
pub struct FixedClassifier {
    categories: RequiredCategories,
}

impl FixedClassifier {
    pub fn new(categories: RequiredCategories) -> Self {
        Self { categories }
    }
}

impl CategoryClassifier for FixedClassifier {
    async fn classify(&self, _query: &str) -> Result<RequiredCategories, RecommendError> {
        Ok(self.categories.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// A classifier that is never available.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableClassifier;

impl CategoryClassifier for UnavailableClassifier {
    async fn classify(&self, _query: &str) -> Result<RequiredCategories, RecommendError> {
        Err(RecommendError::Classifier("no classifier configured".into()))
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}
