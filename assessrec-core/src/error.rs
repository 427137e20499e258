//! Error types for the assessrec-core crate.
//!
//! All errors use stable string messages suitable for display to users
//! and programmatic handling. Query text never appears in error messages.

/// Errors that can occur while loading a catalog or producing recommendations.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    /// A score source could not produce scores for a query.
    #[error("score source error: {0}")]
    Source(String),

    /// The category classifier could not classify a query.
    #[error("classifier error: {0}")]
    Classifier(String),

    /// The catalog could not be loaded, parsed, or written.
    #[error("catalog error: {0}")]
    Catalog(String),

    /// Invalid retrieval configuration.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for assessrec-core results.
pub type Result<T> = std::result::Result<T, RecommendError>;
