//! JSON extraction from model replies
//!
//! Models often wrap the JSON payload in commentary ("Here you go: {...}").
//! Parsing starts at the first `{` and stops after the first complete JSON
//! value, so trailing text is ignored too.

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// Outcome of one enrichment call, as seen by the merge step
#[derive(Debug)]
pub enum ModelReply {
    /// The reply contained a JSON object
    Parsed(Map<String, Value>),
    /// The call itself failed (network, timeout, non-2xx, bad body)
    Transport(Error),
    /// The call succeeded but the text held no usable JSON object
    Decode(String),
}

/// Classify a chat result into a `ModelReply`
pub fn parse_model_reply(result: Result<String>) -> ModelReply {
    match result {
        Ok(text) => match parse_json_object(&text) {
            Ok(map) => ModelReply::Parsed(map),
            Err(reason) => ModelReply::Decode(reason),
        },
        Err(e) => ModelReply::Transport(e),
    }
}

/// Parse the first JSON object in `response`
pub fn parse_json_object(response: &str) -> std::result::Result<Map<String, Value>, String> {
    let start = response
        .find('{')
        .ok_or_else(|| format!("No JSON found in model reply | Raw: {}", truncate(response)))?;

    let json_str = &response[start..];
    let mut stream = serde_json::Deserializer::from_str(json_str).into_iter::<Value>();

    match stream.next() {
        Some(Ok(Value::Object(map))) => Ok(map),
        Some(Ok(other)) => Err(format!("Expected a JSON object, got: {}", other)),
        Some(Err(e)) => Err(format!(
            "Invalid JSON from model: {} | Raw: {}",
            e,
            truncate(json_str)
        )),
        None => Err("Empty model reply".to_string()),
    }
}

/// Truncate long replies for error messages
fn truncate(s: &str) -> String {
    const LIMIT: usize = 200;
    match s.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
