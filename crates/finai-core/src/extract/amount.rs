//! Amount and currency extraction

use std::sync::LazyLock;

use regex::Regex;

/// A number, optionally followed by a currency marker.
///
/// Longer aliases come first: the regex alternation is leftmost-first.
pub(crate) static AMOUNT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?P<amount>\d+(?:[.,]\d{1,2})?)\s*(?P<currency>₽|рублей|рубля|рубль|руб\.?|р\.|rubles|rub|евро|eur|€|долларов|доллара|доллар|долл\.?|usd|\$)?",
    )
    .expect("amount pattern must compile")
});

/// The first amount found in an utterance
#[derive(Debug, Clone, PartialEq)]
pub struct AmountMatch {
    pub value: f64,
    /// Normalized currency code, when a marker followed the number
    pub currency: Option<String>,
}

/// Find the first number in the text (comma or dot as decimal separator).
///
/// Only the first match is considered; if it does not parse to a positive
/// value the amount is absent.
pub fn extract_amount(text: &str) -> Option<AmountMatch> {
    let caps = AMOUNT_RE.captures(text)?;
    let raw = caps.name("amount")?.as_str().replace(',', ".");

    let value: f64 = raw.parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    Some(AmountMatch {
        value,
        currency: caps.name("currency").and_then(|c| currency_code(c.as_str())),
    })
}

/// Map a currency marker to its code
pub fn currency_code(marker: &str) -> Option<String> {
    let m = marker.trim().to_lowercase();
    let code = if m == "₽" || m.starts_with("руб") || m.starts_with("rub") || m == "р." {
        "RUB"
    } else if m == "€" || m.starts_with("eur") || m == "евро" {
        "EUR"
    } else if m == "$" || m.starts_with("usd") || m.starts_with("долл") {
        "USD"
    } else {
        return None;
    };
    Some(code.to_string())
}

/// Lenient numeric coercion for amounts coming back from the model.
///
/// Accepts `"1200,50"`, `"1 200.50"`, `"500₽"`, `"1 200,50 руб."`. Currency
/// marks and punctuation around the number are dropped; anything other than
/// digits, separators and spaces left between the digits makes the value
/// invalid. When both separators are present the comma is taken as a
/// thousands separator.
pub fn parse_amount_str(s: &str) -> Option<f64> {
    let core = s
        .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '-')
        .trim_end_matches(|c: char| !c.is_ascii_digit());

    let body = core.strip_prefix('-').unwrap_or(core);
    if body.is_empty()
        || !body
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | ','))
    {
        return None;
    }

    let compact: String = core.chars().filter(|c| !c.is_whitespace()).collect();
    let normalized = if compact.contains('.') && compact.contains(',') {
        compact.replace(',', "")
    } else {
        compact.replace(',', ".")
    };

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}
