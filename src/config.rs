//! Configuration types for the recommendation service.

use assessrec_core::RetrievalConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Result, ServiceError};

/// Top-level service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener and request limits.
    pub server: ServerConfig,
    /// Catalog location.
    pub catalog: CatalogConfig,
    /// Fusion weights, pool depth, and fallback categories.
    pub retrieval: RetrievalConfig,
    /// Category classifier provider settings.
    pub classifier: ClassifierConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port (`0` = auto-assign).
    pub port: u16,
    /// Result count used when a request omits `top_k`.
    pub default_top_k: usize,
    /// Upper bound applied to any requested `top_k`.
    pub max_top_k: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_owned(),
            port: 8000,
            default_top_k: 10,
            max_top_k: 10,
        }
    }
}

/// Catalog location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// JSON array of raw or processed catalog records.
    pub path: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data").join("assessments_catalog.json"),
        }
    }
}

/// Which classifier provider to use.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierProvider {
    /// Groq if a key is available, then Gemini, else no classifier.
    #[default]
    Auto,
    /// Groq (OpenAI-compatible chat completions).
    Groq,
    /// Google Gemini.
    Gemini,
    /// No classifier; every query uses the fallback categories.
    None,
}

impl ClassifierProvider {
    /// Parse a provider name as used in `LLM_PROVIDER`.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(Self::Auto),
            "groq" => Some(Self::Groq),
            "gemini" => Some(Self::Gemini),
            "none" | "disabled" | "off" => Some(Self::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for ClassifierProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Auto => "auto",
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::None => "none",
        };
        f.write_str(name)
    }
}

/// Connection settings for one hosted model.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderEndpoint {
    /// API key. Usually supplied through the environment instead of the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// API base URL.
    pub base_url: String,
}

impl ProviderEndpoint {
    /// The API key, if one is set and non-blank.
    pub fn key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }
}

impl std::fmt::Debug for ProviderEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderEndpoint")
            .field("api_key", &self.key().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Category classifier configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Provider selection policy.
    pub provider: ClassifierProvider,
    /// Sampling temperature sent to the provider.
    pub temperature: f32,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Groq settings.
    pub groq: ProviderEndpoint,
    /// Gemini settings.
    pub gemini: ProviderEndpoint,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            provider: ClassifierProvider::Auto,
            temperature: 0.1,
            timeout_secs: 10,
            groq: ProviderEndpoint {
                api_key: None,
                model: "llama-3.1-8b-instant".to_owned(),
                base_url: "https://api.groq.com".to_owned(),
            },
            gemini: ProviderEndpoint {
                api_key: None,
                model: "gemini-1.5-flash".to_owned(),
                base_url: "https://generativelanguage.googleapis.com".to_owned(),
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ServiceError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories as needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written or the config cannot be serialized.
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ServiceError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns the default config file path: `~/.config/assessrec/config.toml`.
    pub fn default_config_path() -> PathBuf {
        if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
            PathBuf::from(config).join("assessrec").join("config.toml")
        } else if let Some(home) = std::env::var_os("HOME") {
            PathBuf::from(home)
                .join(".config")
                .join("assessrec")
                .join("config.toml")
        } else {
            PathBuf::from("/tmp/assessrec-config/config.toml")
        }
    }

    /// Apply `GROQ_API_KEY`, `GEMINI_API_KEY`, and `LLM_PROVIDER` from the
    /// process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides using `lookup` in place of the process environment.
    ///
    /// Blank values are ignored. An unrecognized provider name is logged and
    /// ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(key) = get("GROQ_API_KEY") {
            self.classifier.groq.api_key = Some(key);
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.classifier.gemini.api_key = Some(key);
        }
        if let Some(name) = get("LLM_PROVIDER") {
            match ClassifierProvider::parse(&name) {
                Some(provider) => self.classifier.provider = provider,
                None => tracing::warn!(provider = %name, "ignoring unknown LLM_PROVIDER"),
            }
        }
    }

    /// Validates this configuration, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<()> {
        self.retrieval.validate()?;
        if self.server.max_top_k == 0 {
            return Err(ServiceError::Config(
                "server.max_top_k must be greater than 0".into(),
            ));
        }
        if self.server.default_top_k == 0 {
            return Err(ServiceError::Config(
                "server.default_top_k must be greater than 0".into(),
            ));
        }
        if self.classifier.timeout_secs == 0 {
            return Err(ServiceError::Config(
                "classifier.timeout_secs must be greater than 0".into(),
            ));
        }
        if !self.classifier.temperature.is_finite() || self.classifier.temperature < 0.0 {
            return Err(ServiceError::Config(
                "classifier.temperature must be a non-negative number".into(),
            ));
        }
        if self.catalog.path.as_os_str().is_empty() {
            return Err(ServiceError::Config("catalog.path must be set".into()));
        }
        Ok(())
    }
}
