use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

use crate::cli::ProviderKind;
use crate::config::Config;
use crate::errors::CoachResult;
use crate::wire::PromptPayload;

pub mod ollama;
pub mod openai;

/// Sampling knobs shared by every chat-completion backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub max_tokens: u32,
    pub temperature: f64,
}

impl Sampling {
    pub fn from_config(cfg: &Config) -> Self {
        Self { max_tokens: cfg.max_tokens, temperature: cfg.temperature }
    }
}

/// A chat-completion backend. Returns the raw completion text, or `None`
/// when the response carried no content at all.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &str;

    async fn complete(&self, payload: &PromptPayload) -> CoachResult<Option<String>>;
}

pub type DynProvider = Box<dyn Provider + Send + Sync>;

pub fn make_provider(cfg: &Config) -> CoachResult<DynProvider> {
    let timeout = Duration::from_secs(cfg.timeout_secs);
    let sampling = Sampling::from_config(cfg);
    match cfg.provider {
        ProviderKind::OpenAI => Ok(Box::new(openai::OpenAIProvider::new(
            cfg.model.clone(),
            cfg.api_key()?,
            cfg.api_base.clone(),
            timeout,
            sampling,
        )?)),
        ProviderKind::Ollama => Ok(Box::new(ollama::Ollama::new(
            cfg.model.clone(),
            cfg.ollama_url.clone(),
            timeout,
            sampling,
        )?)),
    }
}

/// Statuses worth another attempt: rate limiting and server-side failures.
pub(crate) fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS
}

/// Cut long bodies down before they end up in error messages or logs.
pub(crate) fn excerpt(text: &str) -> String {
    const MAX: usize = 500;
    if text.chars().count() <= MAX {
        return text.to_string();
    }
    let head: String = text.chars().take(MAX).collect();
    format!("{head}…")
}
