//! Keyword category matching

use std::sync::LazyLock;

use regex::Regex;

use crate::models::CATCH_ALL_CATEGORY;

/// Category name -> trigger keywords, checked top to bottom.
///
/// Keywords match as substrings of the lower-cased text, so the first
/// category with any hit wins (food before transport, and so on).
pub const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "food",
        &[
            "еда", "обед", "ужин", "кофе", "ресторан", "кафе", "завтрак", "перекус", "продукты",
            "food", "lunch", "dinner", "breakfast", "coffee", "restaurant", "cafe", "snack",
            "groceries",
        ],
    ),
    (
        "transport",
        &[
            "транспорт", "такси", "uber", "bolt", "метро", "автобус", "taxi", "metro", "subway",
            "transport",
        ],
    ),
    (
        "shopping",
        &["магазин", "шопинг", "кофта", "телефон", "shopping", "clothes", "phone"],
    ),
    (
        "health",
        &["аптека", "медицина", "врач", "pharmacy", "medicine", "doctor"],
    ),
    (
        "income",
        &["зарплата", "доход", "прибыль", "salary", "income", "profit"],
    ),
    (CATCH_ALL_CATEGORY, &[]),
];

/// "на такси", "for books": harvests an ad-hoc category name
static PURPOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:на|для|on|for)\s+([а-яёa-z\-]+)").expect("purpose pattern must compile")
});

/// Pick a category for the utterance; never empty
pub fn extract_category(text: &str) -> String {
    let lowered = text.to_lowercase();

    for (category, keywords) in CATEGORY_KEYWORDS {
        if keywords.iter().any(|k| lowered.contains(k)) {
            return category.to_string();
        }
    }

    if let Some(word) = PURPOSE_RE
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches('-'))
        .filter(|w| !w.is_empty())
    {
        return word.to_string();
    }

    CATCH_ALL_CATEGORY.to_string()
}
