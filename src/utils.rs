use chrono::{NaiveDate, Utc};
use serde_json::Value;

pub fn timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Current calendar date in UTC. Ledger days are UTC days.
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Builds `#Name` from a free-text name. Returns `None` when nothing is left
/// after whitespace removal.
pub fn hashtag(name: &str) -> Option<String> {
    let clean = strip_whitespace(name);
    if clean.is_empty() {
        None
    } else {
        Some(format!("#{}", clean))
    }
}

pub fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// ListenBrainz sends `release_year` as either a number or a string.
pub fn release_year(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => non_empty(Some(s.clone())),
        _ => None,
    }
}
