//! Client for the external text-generation service.
//!
//! Plan generation only sees the [`TextGenerator`] trait; [`OpenAiClient`] is
//! the production implementation over an OpenAI-compatible
//! `/chat/completions` endpoint. One request per call: no retries, no
//! streaming.

use anyhow::Context;
use axum::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::OpenAiConfig;

pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// One completion for `prompt` under `system`. `Ok(None)` means the
    /// service answered without usable text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatResponse {
    fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, config: &OpenAiConfig) -> anyhow::Result<Self> {
        let client = Client::builder().build().context("build http client")?;
        Ok(Self {
            client,
            api_key,
            model: config.model.clone(),
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&raw)
                .map(|e| e.error.message)
                .unwrap_or(raw);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        let text = parsed.into_text();
        debug!(model = %self.model, has_text = text.is_some(), "completion received");
        Ok(text)
    }
}
