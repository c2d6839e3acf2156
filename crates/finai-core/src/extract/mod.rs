//! Heuristic entity extraction
//!
//! The always-available path of the pipeline: amount, category, date and
//! note are pulled out of the raw utterance with regexes and keyword tables.
//! No network, no hidden state; the reference time is an explicit argument
//! so the same input always yields the same result.
//!
//! Each pass runs over the original text independently. Only the note
//! depends on the others: it is the text minus every amount and minus
//! every relative-day keyword.

mod amount;
mod category;
mod date;
mod period;

pub use amount::{currency_code, extract_amount, parse_amount_str, AmountMatch};
pub use category::{extract_category, CATEGORY_KEYWORDS};
pub use date::{extract_date, parse_fuzzy_date, RELATIVE_DAYS};
pub use period::{extract_period, PERIOD_KEYWORDS};

use chrono::NaiveDateTime;

use crate::intent;
use crate::models::{ExtractionSource, ParsedTransaction};

/// Run every heuristic pass over `text`, resolving dates against `now`
pub fn extract(text: &str, now: NaiveDateTime) -> ParsedTransaction {
    let amount = extract_amount(text);
    let note = build_note(text);

    ParsedTransaction {
        intent: intent::classify(text).unwrap_or_default(),
        amount: amount.as_ref().map(|m| m.value),
        currency: amount.and_then(|m| m.currency),
        category: extract_category(text),
        date: extract_date(text, now),
        note,
        period: extract_period(text),
        advice: Vec::new(),
        source: ExtractionSource::Heuristic,
    }
}

/// Residual free text: drop every number (with its currency marker), then
/// every relative-day keyword.
///
/// Lossy on purpose: quantities go along with the price, and a keyword is
/// removed wherever it occurs, including inside longer words.
pub fn build_note(text: &str) -> String {
    let without_amounts = amount::AMOUNT_RE.replace_all(text, "");

    date::RELATIVE_DAY_RE
        .replace_all(&without_amounts, "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    use crate::models::{Intent, CATCH_ALL_CATEGORY};

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 6, 15)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_extract_full_expense() {
        let tx = extract("потратил 1200,50 ₽ на такси", reference());
        assert_eq!(tx.intent, Intent::AddExpense);
        assert_eq!(tx.amount, Some(1200.5));
        assert_eq!(tx.currency.as_deref(), Some("RUB"));
        assert_eq!(tx.category, "transport");
        assert_eq!(tx.date, None);
        // Inner spacing is left as the cut produced it
        assert_eq!(tx.note, "потратил  на такси");
        assert_eq!(tx.source, ExtractionSource::Heuristic);
    }

    #[test]
    fn test_extract_with_relative_day() {
        let tx = extract("Вчера обед 450 руб", reference());
        assert_eq!(tx.amount, Some(450.0));
        assert_eq!(tx.category, "food");
        assert_eq!(
            tx.date,
            NaiveDate::from_ymd_opt(2024, 6, 14)
                .unwrap()
                .and_hms_opt(12, 0, 0)
        );
        assert_eq!(tx.note, "обед");
    }

    #[test]
    fn test_extract_nothing_recognized() {
        let tx = extract("привет", reference());
        assert_eq!(tx.intent, Intent::Unknown);
        assert_eq!(tx.amount, None);
        assert_eq!(tx.category, CATCH_ALL_CATEGORY);
        assert_eq!(tx.date, None);
        assert_eq!(tx.note, "привет");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let text = "позавчера купил кофе за 250,5 руб";
        let first = extract(text, reference());
        let second = extract(text, reference());
        assert_eq!(first, second);
    }

    #[test]
    fn test_note_strips_keywords_everywhere() {
        // Quirk: "сегодня" inside another token is stripped too
        let note = build_note("сегодняшний обед сегодня");
        assert_eq!(note, "шний обед");
    }

    #[test]
    fn test_note_strips_every_amount() {
        let tx = extract("2 кофе по 150 руб", reference());
        assert_eq!(tx.amount, Some(2.0));
        assert_eq!(tx.note, "кофе по");
    }

    #[test]
    fn test_breakfast_reads_as_tomorrow() {
        // Quirk: "завтрак" contains "завтра"
        let tx = extract("завтрак 300 руб", reference());
        assert_eq!(tx.category, "food");
        assert_eq!(
            tx.date,
            NaiveDate::from_ymd_opt(2024, 6, 16)
                .unwrap()
                .and_hms_opt(12, 0, 0)
        );
        assert_eq!(tx.note, "к");
    }

    #[test]
    fn test_note_is_case_insensitive_for_days() {
        assert_eq!(build_note("Вчера такси"), "такси");
        assert_eq!(build_note("Paid Yesterday"), "Paid");
    }
}
