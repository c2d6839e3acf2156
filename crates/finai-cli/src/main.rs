//! FinAI CLI - Natural-language expense extraction
//!
//! Usage:
//!   finai parse "потратил 1200,50 ₽ на такси"   Extract a record
//!   finai parse "купил хлеб" --enrich always    Ask the LLM as well
//!   finai classify "покажи траты за неделю"     Intent only
//!   finai health                                 Check the LLM endpoint

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so `--json` output stays machine-readable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    match cli.command {
        Commands::Parse {
            text,
            intent,
            enrich,
            now,
            json,
        } => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_parse(
                &config,
                &text,
                intent.as_deref(),
                enrich.as_deref(),
                now.as_deref(),
                json,
            )
            .await
        }
        Commands::Classify { text } => commands::cmd_classify(&text),
        Commands::Prompts { action } => match action {
            None | Some(PromptsAction::List) => commands::cmd_prompts_list(),
            Some(PromptsAction::Show { prompt_id }) => commands::cmd_prompts_show(&prompt_id),
            Some(PromptsAction::Path) => commands::cmd_prompts_path(),
        },
        Commands::Health => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_health(&config).await
        }
        Commands::Config => {
            let config = commands::load_config(cli.config.as_deref())?;
            commands::cmd_config(&config, cli.config.as_deref())
        }
    }
}
