use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use super::{excerpt, is_transient_status, Sampling};
use crate::errors::{CoachError, CoachResult};
use crate::wire::PromptPayload;

/// OpenAI-compatible chat-completions backend.
pub struct OpenAIProvider {
    model: String,
    api_key: String,
    api_base: String,
    client: Client,
    sampling: Sampling,
}

#[derive(Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

impl OpenAIProvider {
    pub fn new(
        model: String,
        api_key: String,
        api_base: String,
        timeout: Duration,
        sampling: Sampling,
    ) -> CoachResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { model, api_key, api_base, client, sampling })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    /// Request body: system text, then user content as text plus an optional inline image.
    pub fn request_body(&self, payload: &PromptPayload) -> Value {
        let mut user_parts = vec![json!({ "type": "text", "text": payload.user })];
        if let Some(img) = &payload.image {
            user_parts.push(json!({
                "type": "image_url",
                "image_url": { "url": img.data_url() }
            }));
        }

        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": payload.system },
                { "role": "user", "content": user_parts }
            ],
            "response_format": { "type": "json_object" },
            "max_tokens": self.sampling.max_tokens,
            "temperature": self.sampling.temperature
        })
    }
}

#[async_trait]
impl super::Provider for OpenAIProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, payload: &PromptPayload) -> CoachResult<Option<String>> {
        let url = self.endpoint();
        let body = self.request_body(payload);
        debug!(
            %url,
            model = %self.model,
            has_image = payload.image.is_some(),
            body = %excerpt(&body.to_string()),
            "POST chat completion"
        );

        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        debug!(%status, body = %excerpt(&text), "chat completion response");

        if !status.is_success() {
            return Err(CoachError::transport(
                format!("OpenAI API error ({status}): {}", excerpt(&text)),
                is_transient_status(status),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&text).map_err(|e| {
            CoachError::transport(format!("failed to decode OpenAI response: {e}"), false)
        })?;

        Ok(parsed.choices.into_iter().next().and_then(|c| c.message.content))
    }
}
