//! Hosted-model category classifiers and startup provider selection.
//!
//! The provider is chosen once, when the service starts, into a
//! [`ClassifierBackend`]. The pipeline never branches on which provider is
//! active; it only sees a category set or an error.

pub mod gemini;
pub mod groq;
pub mod parse;

use std::time::Duration;

use assessrec_core::{CategoryClassifier, RecommendError, RequiredCategories};

use crate::config::{ClassifierConfig, ClassifierProvider};
use crate::error::{Result, ServiceError};

pub use gemini::GeminiClassifier;
pub use groq::GroqClassifier;

/// System instruction sent with every classification request.
pub const SYSTEM_PROMPT: &str = "You classify job descriptions and hiring queries into the \
assessment categories they call for. Reply with a single JSON object and nothing else.";

/// Build the user prompt for `query`.
pub fn classification_prompt(query: &str) -> String {
    format!(
        "Analyze this job query and decide which kinds of assessment are needed.\n\n\
         Query: {query}\n\n\
         Test types:\n\
         - K (Knowledge & Skills) for technical skills such as Java, Python, SQL\n\
         - P (Personality & Behavior) for soft skills and personality traits\n\
         - C (Cognitive) for reasoning and problem-solving\n\
         - B (Behavioral) for behavioral assessments\n\n\
         Respond as JSON: {{\"test_types_needed\": [\"K\", \"P\"]}}, listing the most \
         important type first."
    )
}

/// The classifier selected at startup.
#[derive(Debug, Clone)]
pub enum ClassifierBackend {
    Groq(GroqClassifier),
    Gemini(GeminiClassifier),
    /// No provider available; every query uses the fallback categories.
    Disabled,
}

impl ClassifierBackend {
    /// Choose a backend from configuration.
    ///
    /// `auto` prefers Groq, then Gemini, whichever has an API key. An
    /// explicit provider without a key is disabled with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Classifier`] if the HTTP client cannot be built.
    pub fn select(config: &ClassifierConfig) -> Result<Self> {
        let groq = config.groq.key().is_some();
        let gemini = config.gemini.key().is_some();

        let chosen = match config.provider {
            ClassifierProvider::None => None,
            ClassifierProvider::Auto if groq => Some(ClassifierProvider::Groq),
            ClassifierProvider::Auto if gemini => Some(ClassifierProvider::Gemini),
            ClassifierProvider::Auto => None,
            ClassifierProvider::Groq if groq => Some(ClassifierProvider::Groq),
            ClassifierProvider::Gemini if gemini => Some(ClassifierProvider::Gemini),
            explicit => {
                tracing::warn!(provider = %explicit, "no API key for classifier provider, disabling");
                None
            }
        };

        let backend = match chosen {
            Some(ClassifierProvider::Groq) => {
                let endpoint = &config.groq;
                Self::Groq(
                    GroqClassifier::new(endpoint.key().unwrap_or_default(), endpoint.model.clone())
                        .with_base_url(endpoint.base_url.clone())
                        .with_temperature(config.temperature)
                        .with_client(http_client(config.timeout_secs)?),
                )
            }
            Some(ClassifierProvider::Gemini) => {
                let endpoint = &config.gemini;
                Self::Gemini(
                    GeminiClassifier::new(endpoint.key().unwrap_or_default(), endpoint.model.clone())
                        .with_base_url(endpoint.base_url.clone())
                        .with_temperature(config.temperature)
                        .with_client(http_client(config.timeout_secs)?),
                )
            }
            _ => Self::Disabled,
        };

        tracing::info!(
            classifier = backend.name(),
            model = backend.model().unwrap_or("-"),
            "category classifier selected"
        );
        Ok(backend)
    }

    /// Model used by the active provider.
    pub fn model(&self) -> Option<&str> {
        match self {
            Self::Groq(classifier) => Some(classifier.model()),
            Self::Gemini(classifier) => Some(classifier.model()),
            Self::Disabled => None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

/// HTTP client with a per-request timeout.
fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ServiceError::Classifier(format!("failed to build HTTP client: {e}")))
}

impl CategoryClassifier for ClassifierBackend {
    async fn classify(&self, query: &str) -> std::result::Result<RequiredCategories, RecommendError> {
        match self {
            Self::Groq(classifier) => classifier.classify(query).await,
            Self::Gemini(classifier) => classifier.classify(query).await,
            Self::Disabled => Err(RecommendError::Classifier(
                "no classifier provider configured".into(),
            )),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Groq(classifier) => classifier.name(),
            Self::Gemini(classifier) => classifier.name(),
            Self::Disabled => "disabled",
        }
    }
}
