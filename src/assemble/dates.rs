//! Display formatting for post dates.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::constants::DATE_PLACEHOLDER;

/// Format as `Month DD, YYYY · H:MM AM/PM`.
#[must_use]
pub fn format_display(dt: &DateTime<Utc>) -> String {
    dt.format("%B %d, %Y · %-I:%M %p").to_string()
}

/// Display form of a unix timestamp, or the placeholder.
#[must_use]
pub fn display_timestamp(timestamp: Option<i64>) -> String {
    timestamp
        .and_then(|t| DateTime::from_timestamp(t, 0))
        .map_or_else(|| DATE_PLACEHOLDER.to_string(), |dt| format_display(&dt))
}

/// Display form of an API date string (`2024-01-05 15:04:05 GMT`), or the
/// placeholder.
#[must_use]
pub fn display_date_string(date: Option<&str>) -> String {
    date.and_then(parse_api_date)
        .map_or_else(|| DATE_PLACEHOLDER.to_string(), |dt| format_display(&dt))
}

/// Parse `YYYY-MM-DD HH:MM:SS ZONE`. The zone name must be present and
/// alphabetic; the time is taken as UTC.
#[must_use]
pub fn parse_api_date(date: &str) -> Option<DateTime<Utc>> {
    let (datetime, zone) = date.trim().rsplit_once(' ')?;
    if zone.is_empty() || !zone.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    NaiveDateTime::parse_from_str(datetime, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
