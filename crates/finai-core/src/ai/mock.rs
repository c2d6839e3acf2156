//! Mock backend for testing
//!
//! Replies with a scripted text or simulates a transport failure, and
//! records every request so tests can inspect the prompt that was sent.
//! Also selectable at runtime with `FINAI_LLM_BACKEND=mock`.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{ChatBackend, ChatMessage};

/// What the mock answers with
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    Text(String),
    /// Fail as if the endpoint were unreachable
    TransportFailure(String),
}

/// A request as the backend received it
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Mock chat backend
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    model: String,
    reply: MockReply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockBackend {
    /// Healthy mock that answers with an empty JSON object
    pub fn new() -> Self {
        Self::replying("{}")
    }

    /// Mock that answers every request with `text`
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            healthy: true,
            model: "mock".to_string(),
            reply: MockReply::Text(text.into()),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Mock whose every request fails with a connection error
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            healthy: false,
            reply: MockReply::TransportFailure(reason.into()),
            ..Self::new()
        }
    }

    /// Create an unhealthy mock backend
    pub fn unhealthy() -> Self {
        Self {
            healthy: false,
            ..Self::new()
        }
    }

    /// Same script and request log, different model name
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    /// Requests received so far (shared across clones)
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn chat(
        &self,
        messages: &[ChatMessage],
        max_tokens: u32,
        temperature: f32,
    ) -> Result<String> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(RecordedRequest {
                messages: messages.to_vec(),
                max_tokens,
                temperature,
            });
        }

        match &self.reply {
            MockReply::Text(text) => Ok(text.clone()),
            MockReply::TransportFailure(reason) => Err(Error::Io(io::Error::new(
                io::ErrorKind::ConnectionRefused,
                reason.clone(),
            ))),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
