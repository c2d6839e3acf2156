//! Regex intent classifier
//!
//! The fast path of the pipeline: an ordered table of keyword patterns per
//! intent. The first intent with any matching pattern wins, so the table
//! order is the tie-break when an utterance hits several keyword sets:
//!
//! 1. `add_expense`
//! 2. `show_analytics`
//! 3. `give_advice`
//!
//! No match means the caller should ask the LLM.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::Intent;

/// Keyword patterns per intent, in tie-break order
pub const INTENT_PATTERNS: &[(Intent, &[&str])] = &[
    (
        Intent::AddExpense,
        &[
            r"\b(потратил|потратила|купил|купила|заплатил|заплатила|оплатил|оплатила|пополнить|добавь|запиши)\b",
            r"\b(spent|bought|paid|add|record)\b",
        ],
    ),
    (
        Intent::ShowAnalytics,
        &[
            r"\b(сколько|покажи|показать|итог|статистика|анализ|посчитать)\b",
            r"\b(how much|show|stats|statistics|summary|analytics)\b",
        ],
    ),
    (
        Intent::GiveAdvice,
        &[
            r"\b(совет|подскажи|как экономить|рекомендации|что посоветуешь)\b",
            r"\b(advice|recommend|how to save|tips)\b",
        ],
    ),
];

static COMPILED: LazyLock<Vec<(Intent, Vec<Regex>)>> = LazyLock::new(|| {
    INTENT_PATTERNS
        .iter()
        .map(|(intent, patterns)| {
            let regexes = patterns
                .iter()
                .map(|p| Regex::new(p).expect("intent pattern must compile"))
                .collect();
            (*intent, regexes)
        })
        .collect()
});

/// Classify an utterance, or `None` when no keyword fires
pub fn classify(text: &str) -> Option<Intent> {
    let lowered = text.to_lowercase();

    COMPILED
        .iter()
        .find(|(_, regexes)| regexes.iter().any(|re| re.is_match(&lowered)))
        .map(|(intent, _)| *intent)
}
