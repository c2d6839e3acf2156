//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// FinAI - Turn expense messages into structured records
#[derive(Parser)]
#[command(name = "finai")]
#[command(about = "Natural-language expense extraction", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (defaults to ~/.config/finai/finai.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract a structured record from a message
    Parse {
        /// The message, e.g. "потратил 1200,50 ₽ на такси"
        text: String,

        /// Intent to assume instead of classifying (add_expense, show_analytics, give_advice)
        #[arg(long)]
        intent: Option<String>,

        /// When to ask the LLM: never, ambiguous, always (default from config)
        #[arg(long)]
        enrich: Option<String>,

        /// Reference time for relative dates (ISO 8601, default: now)
        #[arg(long)]
        now: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show which intent the keyword classifier picks
    Classify {
        /// The message to classify
        text: String,
    },

    /// Manage LLM prompts (list, show, path)
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Check that the LLM endpoint is reachable
    Health,

    /// Print the effective configuration
    Config,
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (add_expense, show_analytics, give_advice)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
