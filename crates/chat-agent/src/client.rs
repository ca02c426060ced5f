//! HTTP transport to an OpenAI-compatible chat-completion endpoint.
//!
//! The trait seam exists so orchestration and role logic can be exercised
//! against scripted stubs; only [`HttpCompletionClient`] touches the network.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ChatAgentError;
use crate::types::{ModelParams, Turn};
use crate::Result;

/// Default completion API base.
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api";

const DEFAULT_TIMEOUT_SECS: u64 = 120;

// ─── CompletionClient ─────────────────────────────────────────────────────

/// One round trip to the completion service: role-tagged message list in,
/// single assistant text out.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, params: &ModelParams, transcript: &[Turn]) -> Result<String>;
}

// ─── HttpCompletionClient ─────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

/// Production [`CompletionClient`] speaking the OpenAI-compatible
/// `POST {base}/v1/chat/completions` protocol with bearer auth.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpCompletionClient {
    /// Build a client with a bounded per-request timeout.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, params: &ModelParams, transcript: &[Turn]) -> Result<String> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let request = ChatRequest {
            model: &params.model,
            messages: transcript
                .iter()
                .map(|t| ChatMessage {
                    role: t.role.as_str(),
                    content: &t.text,
                })
                .collect(),
            temperature: params.temperature,
        };

        tracing::debug!(model = %params.model, turns = transcript.len(), "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatAgentError::Timeout(self.config.timeout.as_secs())
                } else {
                    ChatAgentError::Http(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatAgentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.is_empty())
            .ok_or(ChatAgentError::EmptyCompletion)
    }
}

// ─── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

// ─── Tests ────────────────────────────────────────────────────────────────
