//! Recommendation orchestrator: fusion, balanced allocation, pipeline.
//!
//! This module merges the semantic and lexical candidate lists into one
//! ranked pool, redistributes the result budget across the categories a
//! query needs, and ties both together with score sources and a classifier.

pub mod allocate;
pub mod fusion;
pub mod pipeline;

pub use pipeline::Recommender;
