//! Groq classifier backend.
//!
//! Groq serves an OpenAI-compatible Chat Completions API at
//! `/openai/v1/chat/completions`. The request asks for a JSON object reply
//! and the first choice's message content is parsed for categories.

use assessrec_core::{CategoryClassifier, RecommendError, RequiredCategories};
use tracing::Instrument;

use super::parse::{map_http_error, parse_categories};
use super::{SYSTEM_PROMPT, classification_prompt};

/// Default Groq API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com";

/// Category classifier backed by a Groq-hosted model.
#[derive(Clone)]
pub struct GroqClassifier {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for GroqClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqClassifier")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GroqClassifier {
    /// Create a classifier with the given API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.into(),
            temperature: 0.1,
            client: reqwest::Client::new(),
        }
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Use a preconfigured HTTP client (for shared timeouts).
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the JSON request body.
    pub fn build_request(&self, query: &str) -> serde_json::Value {
        serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": classification_prompt(query)},
            ],
            "temperature": self.temperature,
            "response_format": {"type": "json_object"},
        })
    }

    async fn request(&self, query: &str) -> Result<RequiredCategories, RecommendError> {
        let url = format!(
            "{}/openai/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&self.build_request(query))
            .send()
            .await
            .map_err(|e| RecommendError::Classifier(format!("groq request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error("groq", status, &body));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| RecommendError::Classifier(format!("groq response unreadable: {e}")))?;
        let content = body
            .pointer("/choices/0/message/content")
            .and_then(|c| c.as_str())
            .ok_or_else(|| RecommendError::Classifier("groq response has no message content".into()))?;

        parse_categories(content)
    }
}

impl CategoryClassifier for GroqClassifier {
    async fn classify(&self, query: &str) -> Result<RequiredCategories, RecommendError> {
        let span = tracing::debug_span!("classifier.request", provider = "groq", model = %self.model);
        self.request(query).instrument(span).await
    }

    fn name(&self) -> &str {
        "groq"
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    #[test]
    fn request_body_asks_for_json_reply() {
        let classifier = GroqClassifier::new("key", "llama-3.1-8b-instant").with_temperature(0.2);
        let body = classifier.build_request("Java developer");
        assert_eq!(body["model"], "llama-3.1-8b-instant");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        let user = body["messages"][1]["content"].as_str().unwrap();
        assert!(user.contains("Java developer"));
        assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
    }

    #[test]
    fn debug_omits_api_key() {
        let classifier = GroqClassifier::new("gsk-secret", "m");
        assert!(!format!("{classifier:?}").contains("gsk-secret"));
    }
}
