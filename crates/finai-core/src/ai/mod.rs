//! Pluggable chat-completion backend abstraction
//!
//! The enrichment step of the pipeline needs exactly one operation: send a
//! short conversation to a chat-completion model and get the reply text.
//!
//! # Architecture
//!
//! - `ChatBackend` trait: defines the interface for all backends
//! - `LlmClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `OpenAICompatibleBackend`, `MockBackend`
//!
//! # Usage
//!
//! ```rust,ignore
//! let config = Config::load(None)?;
//! let client = LlmClient::from_config(&config.llm)?;
//!
//! let reply = client
//!     .chat(&[ChatMessage::user("обед 450")], 300, 0.2)
//!     .await?;
//! ```

mod mock;
mod openai_compatible;
pub mod parsing;

pub use mock::{MockBackend, MockReply, RecordedRequest};
pub use openai_compatible::OpenAICompatibleBackend;
pub use parsing::{parse_model_reply, ModelReply};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::{BackendKind, LlmConfig};
use crate::error::{Error, Result};

/// One message of a chat-completion conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Trait defining the interface for all chat backends
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send the conversation and return the first reply's text.
    ///
    /// Transport errors, non-2xx statuses and undecodable bodies are errors;
    /// nothing is retried.
    async fn chat(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> bool;

    /// Get the model name (for logging)
    fn model(&self) -> &str;

    /// Get the endpoint URL (for logging)
    fn host(&self) -> &str;
}

/// Concrete LLM client enum
#[derive(Clone)]
pub enum LlmClient {
    /// OpenAI-compatible endpoint (OpenRouter, vLLM, LocalAI, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl LlmClient {
    /// Build the configured backend.
    ///
    /// The OpenAI-compatible backend needs an API key; without one this
    /// fails with `Error::Config` rather than at the first request.
    pub fn from_config(config: &LlmConfig) -> Result<Self> {
        match config.backend {
            BackendKind::OpenaiCompatible => {
                let api_key = config.api_key.as_deref().ok_or_else(|| {
                    Error::Config(format!(
                        "{} is not set; export it or use --enrich never",
                        crate::config::ENV_API_KEY
                    ))
                })?;
                let backend = OpenAICompatibleBackend::with_api_key(
                    &config.api_url,
                    &config.model,
                    api_key,
                )
                .with_timeout(config.timeout())?;
                Ok(LlmClient::OpenAICompatible(backend))
            }
            BackendKind::Mock => Ok(LlmClient::Mock(MockBackend::new())),
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        LlmClient::Mock(MockBackend::new())
    }

    /// Create a new instance with a different model
    pub fn with_model(&self, model: &str) -> Self {
        match self {
            LlmClient::OpenAICompatible(b) => LlmClient::OpenAICompatible(b.with_model(model)),
            LlmClient::Mock(b) => LlmClient::Mock(b.with_model(model)),
        }
    }
}

impl From<MockBackend> for LlmClient {
    fn from(backend: MockBackend) -> Self {
        LlmClient::Mock(backend)
    }
}

impl From<OpenAICompatibleBackend> for LlmClient {
    fn from(backend: OpenAICompatibleBackend) -> Self {
        LlmClient::OpenAICompatible(backend)
    }
}

// Delegate to the inner backend
#[async_trait]
impl ChatBackend for LlmClient {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        match self {
            LlmClient::OpenAICompatible(b) => b.chat(messages, max_tokens, temperature).await,
            LlmClient::Mock(b) => b.chat(messages, max_tokens, temperature).await,
        }
    }

    async fn health_check(&self) -> bool {
        match self {
            LlmClient::OpenAICompatible(b) => b.health_check().await,
            LlmClient::Mock(b) => b.health_check().await,
        }
    }

    fn model(&self) -> &str {
        match self {
            LlmClient::OpenAICompatible(b) => b.model(),
            LlmClient::Mock(b) => b.model(),
        }
    }

    fn host(&self) -> &str {
        match self {
            LlmClient::OpenAICompatible(b) => b.host(),
            LlmClient::Mock(b) => b.host(),
        }
    }
}
