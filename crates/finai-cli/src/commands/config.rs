//! Configuration command implementations

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use finai_core::config::{default_config_path, ENV_API_KEY};
use finai_core::Config;

/// Resolve defaults, config file and environment
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).context("Failed to load configuration")
}

/// Print the effective configuration
pub fn cmd_config(config: &Config, explicit: Option<&Path>) -> Result<()> {
    let source = match explicit {
        Some(p) => p.display().to_string(),
        None => match default_config_path() {
            Some(p) if p.exists() => p.display().to_string(),
            _ => "(built-in defaults)".to_string(),
        },
    };

    println!("Config file: {}\n", source);
    print!("{}", render_config(config)?);
    Ok(())
}

/// TOML-like listing with the API key redacted
pub fn render_config(config: &Config) -> Result<String> {
    let llm = &config.llm;
    let key_status = match llm.api_key {
        Some(_) => format!("set via {} (redacted)", ENV_API_KEY),
        None => format!("not set ({})", ENV_API_KEY),
    };

    let mut out = String::new();
    writeln!(out, "[llm]")?;
    writeln!(out, "backend = \"{}\"", llm.backend)?;
    writeln!(out, "api_url = \"{}\"", llm.api_url)?;
    writeln!(out, "model = \"{}\"", llm.model)?;
    writeln!(out, "timeout_secs = {}", llm.timeout_secs)?;
    writeln!(out, "max_tokens = {}", llm.max_tokens)?;
    writeln!(out, "temperature = {}", llm.temperature)?;
    writeln!(out, "# api_key: {}", key_status)?;
    writeln!(out)?;
    writeln!(out, "[extraction]")?;
    writeln!(out, "enrich = \"{}\"", config.extraction.enrich)?;

    Ok(out)
}
