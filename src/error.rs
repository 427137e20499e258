//! Error types for the assessrec service.

use assessrec_core::RecommendError;

/// Top-level error type for the recommendation service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Classifier provider setup or request error.
    #[error("classifier error: {0}")]
    Classifier(String),

    /// HTTP server error.
    #[error("server error: {0}")]
    Server(String),

    /// Labeled dataset or prediction file error.
    #[error("dataset error: {0}")]
    Dataset(String),

    /// Retrieval pipeline error.
    #[error(transparent)]
    Recommend(#[from] RecommendError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServiceError>;
