//! Date extraction: relative-day keywords and a fuzzy date parser

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use regex::{Captures, Regex};

/// Relative-day phrase -> offset in days from the reference date.
///
/// Checked top to bottom; a phrase is always listed before any shorter
/// phrase it contains ("позавчера" before "вчера").
pub const RELATIVE_DAYS: &[(&str, i64)] = &[
    ("позавчера", -2),
    ("послезавтра", 2),
    ("вчера", -1),
    ("сегодня", 0),
    ("завтра", 1),
    ("day before yesterday", -2),
    ("day after tomorrow", 2),
    ("yesterday", -1),
    ("today", 0),
    ("tomorrow", 1),
];

/// Every relative-day phrase, case-insensitive, longest-first via table order
pub(crate) static RELATIVE_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = RELATIVE_DAYS
        .iter()
        .map(|(phrase, _)| regex::escape(phrase))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!("(?i){}", alternation)).expect("relative day pattern must compile")
});

static ISO_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:[T ](\d{1,2}):(\d{2})(?::(\d{2}))?)?")
        .expect("iso date pattern must compile")
});

/// Day-first numeric dates: 15.01.2024, 15/01/24
static NUMERIC_DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{1,2})[./](\d{1,2})[./](\d{4}|\d{2})\b")
        .expect("numeric date pattern must compile")
});

const MONTH_NAMES: &str = concat!(
    "январ[яь]|янв|феврал[яь]|фев|марта|март|мар|апрел[яь]|апр|ма[йя]|июн[яь]|июн|июл[яь]|июл|",
    "августа|август|авг|сентябр[яь]|сен|октябр[яь]|окт|ноябр[яь]|ноя|декабр[яь]|дек|",
    "january|jan|february|feb|march|mar|april|apr|may|june|jun|july|jul|august|aug|",
    "september|sept|sep|october|oct|november|nov|december|dec"
);

/// 15 января, 3 мая 2024, 15 jan
static DAY_MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})\s+({})\b\.?(?:\s+(\d{{4}}))?",
        MONTH_NAMES
    ))
    .expect("day-month pattern must compile")
});

/// January 15, March 3rd 2024
static MONTH_DAY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b({})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?\b(?:,?\s+(\d{{4}}))?",
        MONTH_NAMES
    ))
    .expect("month-day pattern must compile")
});

/// Resolve a date from the utterance against the reference time.
///
/// Relative-day keywords win over any other date-like text and always
/// resolve to noon. Otherwise the fuzzy parser gets a chance.
pub fn extract_date(text: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let lowered = text.to_lowercase();

    for (phrase, offset) in RELATIVE_DAYS {
        if lowered.contains(phrase) {
            return now
                .date()
                .checked_add_signed(Duration::days(*offset))?
                .and_hms_opt(12, 0, 0);
        }
    }

    parse_fuzzy_date(text, now)
}

/// Find a date-like substring and build a datetime from it.
///
/// Components missing from the text (year, time of day) are taken from
/// `default`. Returns `None` when nothing date-like parses.
pub fn parse_fuzzy_date(text: &str, default: NaiveDateTime) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(dt) = parse_exact(trimmed) {
        return Some(dt);
    }

    let time = default.time();
    let year = default.year();

    if let Some(dt) = ISO_DATE_RE
        .captures(trimmed)
        .and_then(|caps| from_iso_captures(&caps, time))
    {
        return Some(dt);
    }

    if let Some(dt) = NUMERIC_DATE_RE.captures(trimmed).and_then(|caps| {
        let day = num(&caps, 1)?;
        let month = num(&caps, 2)?;
        let y = num(&caps, 3)? as i32;
        let y = if y < 100 { 2000 + y } else { y };
        NaiveDate::from_ymd_opt(y, month, day).map(|d| d.and_time(time))
    }) {
        return Some(dt);
    }

    if let Some(dt) = DAY_MONTH_RE.captures(trimmed).and_then(|caps| {
        let day = num(&caps, 1)?;
        let month = month_number(caps.get(2)?.as_str())?;
        let y = num(&caps, 3).map(|y| y as i32).unwrap_or(year);
        NaiveDate::from_ymd_opt(y, month, day).map(|d| d.and_time(time))
    }) {
        return Some(dt);
    }

    MONTH_DAY_RE.captures(trimmed).and_then(|caps| {
        let month = month_number(caps.get(1)?.as_str())?;
        let day = num(&caps, 2)?;
        let y = num(&caps, 3).map(|y| y as i32).unwrap_or(year);
        NaiveDate::from_ymd_opt(y, month, day).map(|d| d.and_time(time))
    })
}

/// Whole-string ISO-8601 / RFC 3339 forms (what a model usually returns)
fn parse_exact(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    let formats = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    formats
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

fn from_iso_captures(caps: &Captures<'_>, default_time: NaiveTime) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(num(caps, 1)? as i32, num(caps, 2)?, num(caps, 3)?)?;

    let time = match num(caps, 4) {
        Some(hour) => NaiveTime::from_hms_opt(hour, num(caps, 5)?, num(caps, 6).unwrap_or(0))?,
        None => default_time,
    };

    Some(date.and_time(time))
}

fn num(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn month_number(name: &str) -> Option<u32> {
    let prefix: String = name.to_lowercase().chars().take(3).collect();
    let month = match prefix.as_str() {
        "янв" | "jan" => 1,
        "фев" | "feb" => 2,
        "мар" | "mar" => 3,
        "апр" | "apr" => 4,
        "май" | "мая" | "may" => 5,
        "июн" | "jun" => 6,
        "июл" | "jul" => 7,
        "авг" | "aug" => 8,
        "сен" | "sep" => 9,
        "окт" | "oct" => 10,
        "ноя" | "nov" => 11,
        "дек" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(18, 45, 30)
            .unwrap()
    }

    fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_relative_days() {
        let now = reference();
        assert_eq!(extract_date("вчера обед 300", now), Some(noon(2024, 3, 9)));
        assert_eq!(extract_date("Сегодня такси", now), Some(noon(2024, 3, 10)));
        assert_eq!(extract_date("завтра заплачу", now), Some(noon(2024, 3, 11)));
        assert_eq!(extract_date("spent 5 yesterday", now), Some(noon(2024, 3, 9)));
    }

    #[test]
    fn test_longer_phrases_win() {
        let now = reference();
        assert_eq!(extract_date("позавчера кино", now), Some(noon(2024, 3, 8)));
        assert_eq!(extract_date("послезавтра кино", now), Some(noon(2024, 3, 12)));
        assert_eq!(
            extract_date("the day before yesterday", now),
            Some(noon(2024, 3, 8))
        );
    }

    #[test]
    fn test_relative_day_beats_explicit_date() {
        let now = reference();
        assert_eq!(
            extract_date("вчера, а не 01.01.2020", now),
            Some(noon(2024, 3, 9))
        );
    }

    #[test]
    fn test_relative_day_crosses_month() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(0, 5, 0)
            .unwrap();
        assert_eq!(extract_date("вчера", now), Some(noon(2024, 2, 29)));
    }

    #[test]
    fn test_fuzzy_numeric_and_iso() {
        let now = reference();
        let time = now.time();
        assert_eq!(
            extract_date("обед 15.01.2024", now),
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_time(time))
        );
        assert_eq!(
            extract_date("кофе 2/2/23", now),
            Some(NaiveDate::from_ymd_opt(2023, 2, 2).unwrap().and_time(time))
        );
        assert_eq!(
            extract_date("paid on 2024-02-05 14:30", now),
            Some(
                NaiveDate::from_ymd_opt(2024, 2, 5)
                    .unwrap()
                    .and_hms_opt(14, 30, 0)
                    .unwrap()
            )
        );
    }

    #[test]
    fn test_fuzzy_month_names() {
        let now = reference();
        let time = now.time();
        assert_eq!(
            extract_date("ужин 5 января", now),
            Some(NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_time(time))
        );
        assert_eq!(
            extract_date("3 мая 2023 подарок", now),
            Some(NaiveDate::from_ymd_opt(2023, 5, 3).unwrap().and_time(time))
        );
        assert_eq!(
            extract_date("dinner on March 3rd", now),
            Some(NaiveDate::from_ymd_opt(2024, 3, 3).unwrap().and_time(time))
        );
    }

    #[test]
    fn test_exact_model_formats() {
        let now = reference();
        assert_eq!(
            parse_fuzzy_date("2024-01-15T09:30:00", now),
            Some(
                NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            parse_fuzzy_date("2024-01-15T09:30:00+03:00", now),
            Some(
                NaiveDate::from_ymd_opt(2024, 1, 15)
                    .unwrap()
                    .and_hms_opt(9, 30, 0)
                    .unwrap()
            )
        );
        assert_eq!(
            parse_fuzzy_date("2024-01-15", now),
            Some(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap().and_time(now.time()))
        );
    }

    #[test]
    fn test_no_date() {
        let now = reference();
        assert_eq!(extract_date("потратил 1200,50 ₽ на такси", now), None);
        assert_eq!(extract_date("3 decks of cards", now), None);
        assert_eq!(parse_fuzzy_date("", now), None);
        assert_eq!(parse_fuzzy_date("not a date", now), None);
    }

    #[test]
    fn test_invalid_calendar_date() {
        let now = reference();
        assert_eq!(parse_fuzzy_date("31.02.2024", now), None);
        assert_eq!(parse_fuzzy_date("30 февраля", now), None);
    }
}
