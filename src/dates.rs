use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Canonical `YYYY-MM-DD` key used locally and as the join value with remote rows.
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Truncates a timestamp to its UTC calendar date and formats it as a key.
pub fn date_key_utc(timestamp: DateTime<Utc>) -> String {
    date_key(timestamp.date_naive())
}

pub fn parse_date_key(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

pub fn is_same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month() && a.day() == b.day()
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}
