use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::ProviderKind;
use crate::errors::{CoachError, CoachResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderKind,
    pub model: String,
    /// Base of an OpenAI-compatible API, without the `/chat/completions` suffix.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub ollama_url: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub catalog_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderKind::OpenAI,
            model: "gpt-4o-mini".into(),
            api_base: "https://api.openai.com/v1".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            ollama_url: "http://localhost:11434".into(),
            max_tokens: 1500,
            temperature: 0.2,
            timeout_secs: 120,
            max_retries: 1,
            retry_base_delay_ms: 500,
            catalog_path: None,
        }
    }
}

impl Config {
    /// Load from a TOML file; missing keys fall back to defaults.
    pub fn load(path: &Path) -> CoachResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| CoachError::Config(e.to_string()))?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> CoachResult<Self> {
        toml::from_str(text).map_err(|e| CoachError::Config(format!("invalid config: {e}")))
    }

    /// Resolve the API credential once, at provider construction.
    pub fn api_key(&self) -> CoachResult<String> {
        match std::env::var(&self.api_key_env) {
            Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(CoachError::Config(format!(
                "{} env var is not set",
                self.api_key_env
            ))),
        }
    }
}
