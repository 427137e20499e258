//! assessrec: assessment recommendation service.
//!
//! Wraps the [`assessrec_core`] retrieval pipeline with everything needed to
//! run it as a service:
//!
//! - **Configuration**: TOML `AppConfig` with environment overrides for secrets
//! - **Classifiers**: hosted-model category classifiers (Groq, Gemini), one
//!   selected at startup
//! - **HTTP**: an axum service with `/health`, `/`, and `/recommend`
//! - **Datasets**: labeled query loading (JSON, spreadsheets) and CSV export
//!
//! The `assessrec` binary drives all of this from the command line.

pub mod classifier;
pub mod config;
pub mod dataset;
pub mod error;
pub mod server;
pub mod startup;

pub use classifier::ClassifierBackend;
pub use config::AppConfig;
pub use error::{Result, ServiceError};
pub use server::{AppState, RecommendServer, router};
pub use startup::{ServiceRecommender, initialize};
