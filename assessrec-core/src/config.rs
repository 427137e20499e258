//! Retrieval configuration with sensible defaults.
//!
//! [`RetrievalConfig`] controls fusion weights, candidate pool depth, and the
//! category set used when no classification is available.

use serde::{Deserialize, Serialize};

use crate::error::RecommendError;
use crate::types::{Category, RequiredCategories};

/// Configuration for the retrieval and reranking pipeline.
///
/// Use [`Default::default()`] for the tuned defaults, or construct with
/// field overrides. Loaded from the `[retrieval]` section of the app config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Weight applied to semantic similarity scores.
    pub semantic_weight: f64,
    /// Weight applied to batch-normalized lexical scores.
    pub lexical_weight: f64,
    /// Number of fused candidates handed to the allocator. Kept larger than
    /// the final result count so each category has depth to draw from.
    pub pool_size: usize,
    /// Each score source is asked for `pool_size * source_depth_factor` items.
    pub source_depth_factor: usize,
    /// Categories used when the classifier is unavailable.
    pub fallback_categories: Vec<Category>,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_weight: 0.6,
            lexical_weight: 0.4,
            pool_size: 30,
            source_depth_factor: 2,
            fallback_categories: RequiredCategories::fallback().into(),
        }
    }
}

impl RetrievalConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    ///
    /// Checks:
    /// - weights are finite and within `[0, 1]`, and not both zero
    /// - `pool_size` and `source_depth_factor` are greater than 0
    /// - `fallback_categories` is not empty
    pub fn validate(&self) -> Result<(), RecommendError> {
        for (name, weight) in [
            ("semantic_weight", self.semantic_weight),
            ("lexical_weight", self.lexical_weight),
        ] {
            if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
                return Err(RecommendError::Config(format!(
                    "{name} must be within [0, 1]"
                )));
            }
        }
        if self.semantic_weight == 0.0 && self.lexical_weight == 0.0 {
            return Err(RecommendError::Config(
                "at least one weight must be non-zero".into(),
            ));
        }
        if self.pool_size == 0 {
            return Err(RecommendError::Config(
                "pool_size must be greater than 0".into(),
            ));
        }
        if self.source_depth_factor == 0 {
            return Err(RecommendError::Config(
                "source_depth_factor must be greater than 0".into(),
            ));
        }
        if self.fallback_categories.is_empty() {
            return Err(RecommendError::Config(
                "fallback_categories must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// How many items each score source should return.
    pub fn source_depth(&self) -> usize {
        self.pool_size.saturating_mul(self.source_depth_factor)
    }

    /// The fallback set as an ordered, de-duplicated category set.
    pub fn fallback(&self) -> RequiredCategories {
        RequiredCategories::new(self.fallback_categories.iter().copied())
    }
}
