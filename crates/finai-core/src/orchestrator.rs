//! Extraction orchestrator
//!
//! Ties the pipeline together:
//!
//! 1. Regex intent classifier and heuristic extractor (always run, offline)
//! 2. Optional LLM enrichment, decided by an [`EnrichPolicy`]
//! 3. Field-by-field merge: a model value wins only when it is usable,
//!    otherwise the heuristic value stays
//!
//! Enrichment never fails the caller. Transport errors, undecodable replies
//! and prompt problems all degrade to the heuristic result, logged at
//! `warn` and otherwise silent.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::ai::{parse_model_reply, ChatBackend, ChatMessage, LlmClient, ModelReply};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::extract::{self, currency_code, parse_amount_str, parse_fuzzy_date};
use crate::intent;
use crate::models::{AnalyticsPeriod, ExtractionSource, Intent, ParsedTransaction};
use crate::prompts::{PromptId, PromptLibrary};

pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

/// System message used when a template has no `# System` section
pub const SYSTEM_INSTRUCTION: &str =
    "You are a JSON-output assistant for finance parsing. Respond with a single JSON object only.";

/// When the pipeline asks the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnrichPolicy {
    /// Heuristics only, no network
    #[serde(rename = "never")]
    Never,
    /// Only when the classifier found nothing, or an expense has no amount
    #[default]
    #[serde(rename = "ambiguous", alias = "when_ambiguous")]
    WhenAmbiguous,
    #[serde(rename = "always")]
    Always,
}

impl EnrichPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::WhenAmbiguous => "ambiguous",
            Self::Always => "always",
        }
    }

    /// Whether a heuristic result should be sent for enrichment
    pub fn wants_enrichment(
        &self,
        classified: Option<Intent>,
        heuristic: &ParsedTransaction,
    ) -> bool {
        match self {
            Self::Never => false,
            Self::Always => true,
            Self::WhenAmbiguous => match classified {
                None => true,
                Some(Intent::AddExpense) => heuristic.amount.is_none(),
                Some(_) => false,
            },
        }
    }
}

impl fmt::Display for EnrichPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnrichPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "ambiguous" | "when_ambiguous" => Ok(Self::WhenAmbiguous),
            "always" => Ok(Self::Always),
            other => Err(Error::InvalidData(format!(
                "Unknown enrich policy '{}' (expected never, ambiguous or always)",
                other
            ))),
        }
    }
}

/// Classifier + extractor + LLM enrichment
#[derive(Clone)]
pub struct Orchestrator {
    client: LlmClient,
    prompts: Arc<RwLock<PromptLibrary>>,
    max_tokens: u32,
    temperature: f32,
}

impl Orchestrator {
    /// Orchestrator with the default prompt library and sampling settings
    pub fn new(client: LlmClient) -> Self {
        Self {
            client,
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// Build the configured client and sampling settings
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = LlmClient::from_config(&config.llm)?;
        Ok(Self::new(client).with_sampling(config.llm.max_tokens, config.llm.temperature))
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    pub fn with_sampling(mut self, max_tokens: u32, temperature: f32) -> Self {
        self.max_tokens = max_tokens;
        self.temperature = temperature;
        self
    }

    /// Full pipeline: heuristics first, enrichment when `policy` asks for it
    pub async fn parse(
        &self,
        text: &str,
        now: NaiveDateTime,
        policy: EnrichPolicy,
    ) -> ParsedTransaction {
        self.parse_with_hint(text, None, now, policy).await
    }

    /// Like [`parse`](Self::parse), with a caller-supplied intent replacing
    /// the classifier's answer when present
    pub async fn parse_with_hint(
        &self,
        text: &str,
        hint: Option<Intent>,
        now: NaiveDateTime,
        policy: EnrichPolicy,
    ) -> ParsedTransaction {
        let classified = hint.or_else(|| intent::classify(text));
        let mut heuristic = extract::extract(text, now);
        if let Some(intent) = hint {
            heuristic.intent = intent;
        }

        if !policy.wants_enrichment(classified, &heuristic) {
            debug!(intent = %heuristic.intent, policy = %policy, "Heuristic result kept");
            return heuristic;
        }

        self.enrich(text, classified, now, heuristic).await
    }

    /// Ask the model about `text` and merge its answer over the heuristics.
    ///
    /// `hint` selects the prompt; absent or `Unknown` means `add_expense`.
    /// Always returns a result.
    pub async fn refine(
        &self,
        text: &str,
        hint: Option<Intent>,
        now: NaiveDateTime,
    ) -> ParsedTransaction {
        let heuristic = extract::extract(text, now);
        self.enrich(text, hint, now, heuristic).await
    }

    async fn enrich(
        &self,
        text: &str,
        hint: Option<Intent>,
        now: NaiveDateTime,
        heuristic: ParsedTransaction,
    ) -> ParsedTransaction {
        let effective = effective_intent(hint);

        let messages = match self.render_messages(effective, text) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(intent = %effective, error = %e, "Prompt unavailable, using heuristics");
                return fallback(heuristic, effective, text);
            }
        };

        let result = self
            .client
            .chat(&messages, self.max_tokens, self.temperature)
            .await;

        match parse_model_reply(result) {
            ModelReply::Parsed(map) => {
                debug!(
                    intent = %effective,
                    model = %self.client.model(),
                    "Model reply merged"
                );
                merge(&map, heuristic, effective, now)
            }
            ModelReply::Transport(e) => {
                warn!(
                    intent = %effective,
                    model = %self.client.model(),
                    error = %e,
                    "LLM request failed, using heuristics"
                );
                fallback(heuristic, effective, text)
            }
            ModelReply::Decode(reason) => {
                warn!(
                    intent = %effective,
                    model = %self.client.model(),
                    error = %reason,
                    "Unusable model reply, using heuristics"
                );
                fallback(heuristic, effective, text)
            }
        }
    }

    /// System + user messages for the intent's template
    fn render_messages(&self, intent: Intent, text: &str) -> Result<Vec<ChatMessage>> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::InvalidData("Failed to acquire prompt library lock".into()))?;
        let template = prompts.get(PromptId::for_intent(intent))?;

        let mut vars = HashMap::new();
        vars.insert("text", text);

        let system = template.system_section().unwrap_or(SYSTEM_INSTRUCTION);
        Ok(vec![
            ChatMessage::system(system),
            ChatMessage::user(template.render_user(&vars)),
        ])
    }
}

fn effective_intent(hint: Option<Intent>) -> Intent {
    match hint {
        Some(Intent::Unknown) | None => Intent::AddExpense,
        Some(intent) => intent,
    }
}

/// Heuristic result with the requested intent and the raw text as note
fn fallback(heuristic: ParsedTransaction, intent: Intent, text: &str) -> ParsedTransaction {
    ParsedTransaction {
        intent,
        note: text.to_string(),
        source: ExtractionSource::Heuristic,
        ..heuristic
    }
}

fn merge(
    reply: &Map<String, Value>,
    heuristic: ParsedTransaction,
    effective: Intent,
    now: NaiveDateTime,
) -> ParsedTransaction {
    let text_field = |key: &str| {
        reply
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    };

    let intent = text_field("intent")
        .and_then(Intent::from_label)
        .filter(|i| *i != Intent::Unknown)
        .unwrap_or(effective);

    // 0 from the model counts as "no amount"
    let amount = reply
        .get("amount")
        .and_then(model_amount)
        .filter(|v| *v > 0.0)
        .or(heuristic.amount);

    let date = text_field("date")
        .and_then(|s| parse_fuzzy_date(s, now))
        .or(heuristic.date);

    let currency = text_field("currency")
        .map(|s| currency_code(s).unwrap_or_else(|| s.to_uppercase()))
        .or(heuristic.currency);

    let period = text_field("period")
        .and_then(|s| s.parse::<AnalyticsPeriod>().ok())
        .or(heuristic.period);

    let advice = reply
        .get("advice")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    ParsedTransaction {
        intent,
        amount,
        currency,
        category: text_field("category")
            .map(String::from)
            .unwrap_or(heuristic.category),
        date,
        note: text_field("note").map(String::from).unwrap_or(heuristic.note),
        period,
        advice,
        source: ExtractionSource::Enriched,
    }
}

/// Numbers as-is, strings through the lenient parser
fn model_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_amount_str(s),
        _ => None,
    }
    .filter(|v| v.is_finite())
}
