//! LLM endpoint command implementations

use anyhow::{Context, Result};
use finai_core::{ChatBackend, Config, LlmClient};

/// Check the configured LLM endpoint and report
pub async fn cmd_health(config: &Config) -> Result<()> {
    let client = LlmClient::from_config(&config.llm).context("Cannot build LLM client")?;

    println!("Backend:  {}", config.llm.backend);
    println!("Endpoint: {}", client.host());
    println!("Model:    {}", client.model());

    print!("Checking availability... ");
    if check_health(&client).await {
        println!("✅ Connected");
    } else {
        println!("❌ Failed");
        println!();
        println!("Parsing still works offline: finai parse \"...\" --enrich never");
    }

    Ok(())
}

pub async fn check_health(client: &LlmClient) -> bool {
    let healthy = client.health_check().await;
    tracing::debug!(host = %client.host(), healthy, "Health check finished");
    healthy
}
