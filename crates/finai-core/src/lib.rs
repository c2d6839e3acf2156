//! FinAI Core Library
//!
//! Turns a free-form expense utterance ("потратил 1200,50 ₽ на такси")
//! into a structured record:
//! - Regex intent classifier with a fixed tie-break order
//! - Heuristic amount, category, date and note extraction
//! - Pluggable chat-completion backends (OpenAI-compatible, mock)
//! - Prompt library with per-user overrides
//! - Orchestrator that merges model output over heuristics and degrades
//!   silently when the model is unavailable

pub mod ai;
pub mod config;
pub mod error;
pub mod extract;
pub mod intent;
pub mod models;
pub mod orchestrator;
pub mod prompts;

/// Test utilities including mock chat-completion server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    ChatBackend, ChatMessage, LlmClient, MockBackend, ModelReply, OpenAICompatibleBackend,
};
pub use config::{BackendKind, Config, ExtractionConfig, LlmConfig};
pub use error::{Error, Result};
pub use extract::{extract, parse_fuzzy_date};
pub use intent::classify;
pub use models::{AnalyticsPeriod, ExtractionSource, Intent, ParsedTransaction, CATCH_ALL_CATEGORY};
pub use orchestrator::{EnrichPolicy, Orchestrator};
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
