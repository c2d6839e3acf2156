//! Parse and classify command implementations

use std::fmt::Write as _;

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDateTime};
use finai_core::{
    classify, extract, parse_fuzzy_date, Config, EnrichPolicy, Intent, Orchestrator,
    ParsedTransaction,
};

/// Extract a record and print it
pub async fn cmd_parse(
    config: &Config,
    text: &str,
    intent: Option<&str>,
    enrich: Option<&str>,
    now: Option<&str>,
    json: bool,
) -> Result<()> {
    let tx = run_parse(config, text, intent, enrich, now).await?;
    print!("{}", render_transaction(&tx, json)?);
    Ok(())
}

/// Resolve the CLI options and run the pipeline
pub async fn run_parse(
    config: &Config,
    text: &str,
    intent: Option<&str>,
    enrich: Option<&str>,
    now: Option<&str>,
) -> Result<ParsedTransaction> {
    let now = parse_now(now)?;
    let hint = intent.map(parse_intent).transpose()?;
    let policy = match enrich {
        Some(p) => p.parse::<EnrichPolicy>()?,
        None => config.extraction.enrich,
    };

    if policy == EnrichPolicy::Never {
        let mut tx = extract(text, now);
        if let Some(intent) = hint {
            tx.intent = intent;
        }
        return Ok(tx);
    }

    let orchestrator = Orchestrator::from_config(config)
        .context("Cannot enrich with the LLM (pass --enrich never for offline parsing)")?;

    Ok(orchestrator.parse_with_hint(text, hint, now, policy).await)
}

/// Print the classifier's answer
pub fn cmd_classify(text: &str) -> Result<()> {
    match classify(text) {
        Some(intent) => println!("{}", intent),
        None => println!("{} (no keyword matched)", Intent::Unknown),
    }
    Ok(())
}

/// `--now` value, or the local wall clock
pub fn parse_now(value: Option<&str>) -> Result<NaiveDateTime> {
    let wall_clock = Local::now().naive_local();
    match value {
        None => Ok(wall_clock),
        Some(s) => match parse_fuzzy_date(s, wall_clock) {
            Some(dt) => Ok(dt),
            None => bail!("Invalid --now value '{}': expected an ISO 8601 date", s),
        },
    }
}

fn parse_intent(label: &str) -> Result<Intent> {
    match Intent::from_label(label) {
        Some(intent) => Ok(intent),
        None => bail!(
            "Unknown intent '{}' (expected add_expense, show_analytics or give_advice)",
            label
        ),
    }
}

/// Human-readable table, or pretty JSON with `json`
pub fn render_transaction(tx: &ParsedTransaction, json: bool) -> Result<String> {
    if json {
        let mut out = serde_json::to_string_pretty(tx)?;
        out.push('\n');
        return Ok(out);
    }

    let amount = match (tx.amount, tx.currency.as_deref()) {
        (Some(value), Some(code)) => format!("{:.2} {}", value, code),
        (Some(value), None) => format!("{:.2}", value),
        (None, _) => "-".to_string(),
    };
    let date = tx
        .date
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut out = String::new();
    writeln!(out, "{:<10} {}", "Intent:", tx.intent)?;
    writeln!(out, "{:<10} {}", "Amount:", amount)?;
    writeln!(out, "{:<10} {}", "Category:", tx.category)?;
    writeln!(out, "{:<10} {}", "Date:", date)?;
    writeln!(out, "{:<10} {}", "Note:", tx.note)?;
    if let Some(period) = tx.period {
        writeln!(out, "{:<10} {}", "Period:", period)?;
    }
    if !tx.advice.is_empty() {
        writeln!(out, "Advice:")?;
        for (i, item) in tx.advice.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, item)?;
        }
    }
    writeln!(out, "{:<10} {}", "Source:", tx.source)?;

    Ok(out)
}
