//! Domain models for FinAI

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Catch-all category used when nothing more specific is recognized
pub const CATCH_ALL_CATEGORY: &str = "others";

/// What the user wants from a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Record an expense (or income)
    AddExpense,
    /// Show spending analytics
    ShowAnalytics,
    /// Give saving advice
    GiveAdvice,
    /// Nothing matched
    #[default]
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AddExpense => "add_expense",
            Self::ShowAnalytics => "show_analytics",
            Self::GiveAdvice => "give_advice",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a label produced by a model or typed by a user.
    ///
    /// Accepts the snake_case names and the Russian labels the bot used
    /// in its prompts. Returns `None` for anything else.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "add_expense" | "add-expense" | "добавить_трату" => Some(Self::AddExpense),
            "show_analytics" | "show-analytics" | "показать_аналитику" => {
                Some(Self::ShowAnalytics)
            }
            "give_advice" | "give-advice" | "дать_совет" => Some(Self::GiveAdvice),
            "unknown" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_label(s).ok_or_else(|| format!("Unknown intent: {}", s))
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reporting window requested by an analytics query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsPeriod {
    Last7Days,
    Last30Days,
    ThisMonth,
    Custom,
}

impl AnalyticsPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Last7Days => "last_7_days",
            Self::Last30Days => "last_30_days",
            Self::ThisMonth => "this_month",
            Self::Custom => "custom",
        }
    }
}

impl std::str::FromStr for AnalyticsPeriod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "last_7_days" => Ok(Self::Last7Days),
            "last_30_days" => Ok(Self::Last30Days),
            "this_month" => Ok(Self::ThisMonth),
            "custom" => Ok(Self::Custom),
            _ => Err(format!("Unknown analytics period: {}", s)),
        }
    }
}

impl std::fmt::Display for AnalyticsPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which path produced a parsed transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionSource {
    /// Regex/keyword extraction only
    #[default]
    Heuristic,
    /// Model answer merged with heuristics
    Enriched,
}

impl ExtractionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Heuristic => "heuristic",
            Self::Enriched => "enriched",
        }
    }
}

impl std::fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured result of parsing one utterance
///
/// Built fresh for every message and handed to the caller, which owns
/// persistence and replies. A missing `amount` or `date` means "ask the
/// user", never zero or today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedTransaction {
    pub intent: Intent,
    pub amount: Option<f64>,
    /// Currency code (RUB, EUR, USD) when a marker followed the amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    /// Always populated; `CATCH_ALL_CATEGORY` when nothing matched
    pub category: String,
    pub date: Option<NaiveDateTime>,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<AnalyticsPeriod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advice: Vec<String>,
    #[serde(default)]
    pub source: ExtractionSource,
}

impl ParsedTransaction {
    /// True when the category fell through to the catch-all bucket
    pub fn is_uncategorized(&self) -> bool {
        self.category == CATCH_ALL_CATEGORY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_labels() {
        assert_eq!(Intent::from_label("add_expense"), Some(Intent::AddExpense));
        assert_eq!(
            Intent::from_label("показать_аналитику"),
            Some(Intent::ShowAnalytics)
        );
        assert_eq!(Intent::from_label(" Give_Advice "), Some(Intent::GiveAdvice));
        assert_eq!(Intent::from_label("buy_stuff"), None);
        assert!("nope".parse::<Intent>().is_err());
    }

    #[test]
    fn test_intent_serializes_snake_case() {
        let json = serde_json::to_string(&Intent::ShowAnalytics).unwrap();
        assert_eq!(json, "\"show_analytics\"");
    }

    #[test]
    fn test_period_parse() {
        assert_eq!(
            "last_7_days".parse::<AnalyticsPeriod>().unwrap(),
            AnalyticsPeriod::Last7Days
        );
        assert_eq!(AnalyticsPeriod::ThisMonth.to_string(), "this_month");
        assert!("yesterday".parse::<AnalyticsPeriod>().is_err());
    }

    #[test]
    fn test_transaction_serialization_skips_empty_extras() {
        let tx = ParsedTransaction {
            intent: Intent::AddExpense,
            amount: Some(500.0),
            currency: None,
            category: "food".to_string(),
            date: None,
            note: "обед".to_string(),
            period: None,
            advice: vec![],
            source: ExtractionSource::Heuristic,
        };

        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["intent"], "add_expense");
        assert_eq!(json["amount"], 500.0);
        assert_eq!(json["source"], "heuristic");
        assert!(json.get("period").is_none());
        assert!(json.get("advice").is_none());
        assert!(json["date"].is_null());
        assert!(!tx.is_uncategorized());
    }
}
