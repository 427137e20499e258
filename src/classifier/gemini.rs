//! Gemini classifier backend (`generateContent` REST API).

use assessrec_core::{CategoryClassifier, RecommendError, RequiredCategories};
use tracing::Instrument;

use super::parse::{map_http_error, parse_categories};
use super::{SYSTEM_PROMPT, classification_prompt};

/// Default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Category classifier backed by a Gemini model.
#[derive(Clone)]
pub struct GeminiClassifier {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
    client: reqwest::Client,
}

impl std::fmt::Debug for GeminiClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClassifier")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiClassifier {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.into(),
            temperature: 0.1,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the JSON request body. The system prompt is sent as a
    /// system instruction.
    pub fn build_request(&self, query: &str) -> serde_json::Value {
        serde_json::json!({
            "systemInstruction": {"parts": [{"text": SYSTEM_PROMPT}]},
            "contents": [{
                "role": "user",
                "parts": [{"text": classification_prompt(query)}],
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "responseMimeType": "application/json",
            },
        })
    }

    async fn request(&self, query: &str) -> Result<RequiredCategories, RecommendError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&self.build_request(query))
            .send()
            .await
            // Strip the URL so the key in the query string never reaches logs.
            .map_err(|e| {
                RecommendError::Classifier(format!("gemini request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_http_error("gemini", status, &body));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            RecommendError::Classifier(format!("gemini response unreadable: {}", e.without_url()))
        })?;
        let text = body
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|t| t.as_str())
            .ok_or_else(|| RecommendError::Classifier("gemini response has no candidate text".into()))?;

        parse_categories(text)
    }
}

impl CategoryClassifier for GeminiClassifier {
    async fn classify(&self, query: &str) -> Result<RequiredCategories, RecommendError> {
        let span =
            tracing::debug_span!("classifier.request", provider = "gemini", model = %self.model);
        self.request(query).instrument(span).await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
