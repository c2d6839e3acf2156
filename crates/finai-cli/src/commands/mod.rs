//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `config` - Config loading and the `config` command
//! - `llm` - LLM endpoint health check
//! - `parse` - Extraction and intent classification
//! - `prompts` - Prompt library management commands

pub mod config;
pub mod llm;
pub mod parse;
pub mod prompts;

// Re-export command functions for main.rs
pub use config::*;
pub use llm::*;
pub use parse::*;
pub use prompts::*;
