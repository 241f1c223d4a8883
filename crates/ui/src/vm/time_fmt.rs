use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}

/// Calendar date as shown in the history list, e.g. `Nov 14, 2023`.
#[must_use]
pub fn format_day(value: DateTime<Utc>) -> String {
    value.format("%b %-d, %Y").to_string()
}

/// Rest countdown as `m:ss`.
#[must_use]
pub fn format_countdown(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
