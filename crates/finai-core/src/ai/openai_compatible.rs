//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - OpenRouter (https://openrouter.ai/api/v1/chat/completions, the default)
//! - vLLM (http://localhost:8000/v1/chat/completions)
//! - LocalAI / llama-server (http://localhost:8080/v1/chat/completions)
//!
//! The configured URL is the full completions endpoint, not a base URL.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

use super::{ChatBackend, ChatMessage};

const COMPLETIONS_SUFFIX: &str = "/chat/completions";

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAICompatibleBackend {
    /// Create a backend without authentication
    pub fn new(endpoint: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: None,
        }
    }

    /// Create with a bearer API key
    pub fn with_api_key(endpoint: &str, model: &str, api_key: &str) -> Self {
        Self {
            api_key: Some(api_key.to_string()),
            ..Self::new(endpoint, model)
        }
    }

    /// Rebuild the HTTP client with a per-request timeout
    pub fn with_timeout(self, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            ..self
        })
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// `GET` target for the health check: the sibling `/models` listing
    fn models_url(&self) -> String {
        match self.endpoint.strip_suffix(COMPLETIONS_SUFFIX) {
            Some(base) => format!("{}/models", base),
            None => self.endpoint.clone(),
        }
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

/// Pull the reply text out of a decoded response body.
///
/// `choices[0].message.content`, or an empty string when that choice has no
/// content. Bodies without choices are handed back serialized, unchanged.
fn reply_text(body: &Value) -> String {
    match body.get("choices").and_then(|c| c.get(0)) {
        Some(choice) => choice
            .get("message")
            .and_then(|m| m.get("content"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        None => body.to_string(),
    }
}

#[async_trait]
impl ChatBackend for OpenAICompatibleBackend {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages,
            max_tokens,
            temperature,
        };

        let mut req_builder = self.http_client.post(&self.endpoint).json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let decoded: Value = serde_json::from_str(&body)?;
        let text = reply_text(&decoded);
        debug!(model = %self.model, chars = text.len(), "Chat completion received");

        Ok(text)
    }

    async fn health_check(&self) -> bool {
        let mut req_builder = self.http_client.get(self.models_url());
        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        match req_builder.send().await {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                debug!(error = %e, endpoint = %self.endpoint, "Health check failed");
                false
            }
        }
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        &self.endpoint
    }
}
