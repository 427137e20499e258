//! Startup initialization: loads the catalog, builds score indexes, and
//! selects the category classifier.
//!
//! Call [`initialize`] once at startup. The returned [`Recommender`] is
//! read-only and can be shared across concurrent requests.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use assessrec_core::{Catalog, Recommender, build_recommender};
use tracing::{info, warn};

use crate::classifier::ClassifierBackend;
use crate::config::AppConfig;
use crate::error::{Result, ServiceError};

/// The service pipeline with its startup-selected classifier.
pub type ServiceRecommender = Recommender<ClassifierBackend>;

/// Load the catalog named by `config.catalog.path`.
///
/// # Errors
///
/// Returns an error if the file is missing or malformed.
pub fn load_catalog(config: &AppConfig) -> Result<Arc<Catalog>> {
    let path = &config.catalog.path;
    if !path.exists() {
        return Err(ServiceError::Config(format!(
            "catalog file not found: {}",
            path.display()
        )));
    }
    let catalog = Catalog::load_json(path)?;
    if catalog.is_empty() {
        warn!(path = %path.display(), "catalog has no usable records");
    }
    for (category, count) in catalog.category_counts() {
        info!(category = %category, name = category.full_name(), count, "catalog distribution");
    }
    Ok(Arc::new(catalog))
}

/// Validate `config`, load the catalog, build both score indexes, and select
/// the classifier.
///
/// # Errors
///
/// Returns an error if the config is invalid, the catalog cannot be loaded,
/// or the classifier HTTP client cannot be built.
pub fn initialize(config: &AppConfig) -> Result<Arc<ServiceRecommender>> {
    config.validate()?;
    let catalog = load_catalog(config)?;
    initialize_with_catalog(config, catalog)
}

/// Like [`initialize`], with a catalog that is already loaded.
pub fn initialize_with_catalog(
    config: &AppConfig,
    catalog: Arc<Catalog>,
) -> Result<Arc<ServiceRecommender>> {
    let started = Instant::now();
    let classifier = ClassifierBackend::select(&config.classifier)?;
    let recommender = build_recommender(catalog, classifier, config.retrieval.clone())?;
    info!(
        items = recommender.catalog().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "retrieval indexes built"
    );
    Ok(Arc::new(recommender))
}

/// Normalize a raw catalog file and write the processed records.
///
/// Returns the number of items written.
pub fn process_catalog(input: &Path, output: &Path) -> Result<usize> {
    let catalog = Catalog::load_json(input)?;
    catalog.save_processed(output)?;
    info!(
        input = %input.display(),
        output = %output.display(),
        items = catalog.len(),
        "processed catalog written"
    );
    Ok(catalog.len())
}
