//! OpenAI-compatible chat completions client (OpenRouter by default)

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clients::traits::{ChatMessage, CompletionRequest, CompletionService};
use crate::config::{Config, RemoteConfig};
use crate::error::{FlagDetectorError, Result};

/// Cap on the error body kept from a failed response
const ERROR_BODY_CAP: usize = 2048;

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    top_p: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionEnvelope {
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

#[derive(Clone, Debug)]
pub struct ChatCompletionsClient {
    endpoint: String,
    api_key: String,
    remote: RemoteConfig,
    client: Client,
}

impl ChatCompletionsClient {
    pub fn new(remote: RemoteConfig, api_key: impl Into<String>) -> Result<Self> {
        let endpoint = if remote.base_url.ends_with("/chat/completions") {
            remote.base_url.clone()
        } else {
            format!("{}/chat/completions", remote.base_url.trim_end_matches('/'))
        };

        let client = Client::builder()
            .timeout(Duration::from_millis(remote.timeout_ms))
            .build()
            .map_err(|e| FlagDetectorError::Config {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint,
            api_key: api_key.into(),
            remote,
            client,
        })
    }

    /// Build from loaded configuration; fails when no credential is configured
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.api_key()?.to_string();
        Self::new(config.remote.clone(), api_key)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CompletionService for ChatCompletionsClient {
    async fn submit(&self, request: &CompletionRequest) -> Result<String> {
        let request_id = Uuid::new_v4();
        let started = Instant::now();
        let body = ChatCompletionBody {
            model: &self.remote.model,
            messages: request.messages(),
            temperature: request.temperature.unwrap_or(self.remote.temperature),
            max_tokens: request.max_tokens.unwrap_or(self.remote.max_tokens),
            top_p: self.remote.top_p,
        };

        tracing::debug!(
            %request_id,
            model = %self.remote.model,
            prompt_chars = request.prompt.len(),
            "submitting completion request"
        );

        let mut builder = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(referer) = &self.remote.referer {
            builder = builder.header("HTTP-Referer", referer);
        }
        if let Some(title) = &self.remote.title {
            builder = builder.header("X-Title", title);
        }

        let resp = builder.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read response body".to_string());
            let body: String = body_text.chars().take(ERROR_BODY_CAP).collect();
            tracing::warn!(%request_id, status = status.as_u16(), "completion service returned an error");
            return Err(FlagDetectorError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        let envelope: ChatCompletionEnvelope = serde_json::from_str(&text)?;
        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .ok_or_else(|| FlagDetectorError::Schema {
                message: "completion response has no choices[0].message.content".to_string(),
            })?;

        tracing::debug!(
            %request_id,
            elapsed_ms = started.elapsed().as_millis() as u64,
            content_chars = content.len(),
            "completion received"
        );

        Ok(content)
    }
}
