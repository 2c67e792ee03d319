use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{excerpt, is_transient_status, Provider, Sampling};
use crate::errors::{CoachError, CoachResult};
use crate::wire::PromptPayload;

pub struct Ollama {
    model: String,
    url: String,
    client: Client,
    sampling: Sampling,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    stream: bool,
    format: &'a str,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f64,
    num_predict: u32,
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<&'a str>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    message: Option<MsgOut>,
}

#[derive(Deserialize)]
struct MsgOut {
    #[serde(default)]
    content: Option<String>,
}

impl Ollama {
    pub fn new(model: String, url: String, timeout: Duration, sampling: Sampling) -> CoachResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { model, url, client, sampling })
    }

    fn to_request<'a>(&'a self, payload: &'a PromptPayload) -> ChatRequest<'a> {
        let images = payload.image.iter().map(|i| i.base64.as_str()).collect();
        ChatRequest {
            model: &self.model,
            messages: vec![
                Msg { role: "system", content: &payload.system, images: Vec::new() },
                Msg { role: "user", content: &payload.user, images },
            ],
            stream: false,
            format: "json",
            options: OllamaOptions {
                temperature: self.sampling.temperature,
                num_predict: self.sampling.max_tokens,
            },
        }
    }
}

#[async_trait]
impl Provider for Ollama {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, payload: &PromptPayload) -> CoachResult<Option<String>> {
        let url = format!("{}/api/chat", self.url.trim_end_matches('/'));
        let body = self.to_request(payload);
        debug!(
            %url,
            model = %self.model,
            body = %excerpt(&serde_json::to_string(&body).unwrap_or_default()),
            "POST ollama chat"
        );

        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(%status, body = %excerpt(&text), "ollama response");

        if !status.is_success() {
            return Err(CoachError::transport(
                format!("ollama error ({status}): {}", excerpt(&text)),
                is_transient_status(status),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            CoachError::transport(format!("failed to decode ollama response: {e}"), false)
        })?;
        Ok(parsed.message.and_then(|m| m.content))
    }
}
