//! Analytics period keywords

use crate::models::AnalyticsPeriod;

/// Period -> trigger substrings, checked top to bottom ("this month" before "month")
pub const PERIOD_KEYWORDS: &[(AnalyticsPeriod, &[&str])] = &[
    (
        AnalyticsPeriod::ThisMonth,
        &["этот месяц", "этом месяце", "текущий месяц", "this month"],
    ),
    (
        AnalyticsPeriod::Last7Days,
        &["недел", "7 дней", "week", "7 days"],
    ),
    (
        AnalyticsPeriod::Last30Days,
        &["месяц", "30 дней", "month", "30 days"],
    ),
];

pub fn extract_period(text: &str) -> Option<AnalyticsPeriod> {
    let lowered = text.to_lowercase();
    PERIOD_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(period, _)| *period)
}
