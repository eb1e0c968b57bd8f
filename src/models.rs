use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Date key → checked flag. Absence means unchecked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct CheckedDateSet {
    dates: BTreeMap<String, bool>,
}

impl CheckedDateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reduces fetched rows into a set; rows without a date are skipped.
    pub fn from_rows<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = RemoteRow>,
    {
        let dates = rows
            .into_iter()
            .filter_map(|row| row.date)
            .filter(|date| !date.is_empty())
            .map(|date| (date, true))
            .collect();
        Self { dates }
    }

    pub fn is_checked(&self, key: &str) -> bool {
        self.dates.get(key).copied().unwrap_or(false)
    }

    pub fn check(&mut self, key: impl Into<String>) {
        self.dates.insert(key.into(), true);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.dates.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.dates.clear();
    }

    pub fn len(&self) -> usize {
        self.dates.values().filter(|checked| **checked).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn checked_keys(&self) -> impl Iterator<Item = &str> {
        self.dates
            .iter()
            .filter(|(_, checked)| **checked)
            .map(|(key, _)| key.as_str())
    }
}

impl<K: Into<String>> FromIterator<K> for CheckedDateSet {
    fn from_iter<T: IntoIterator<Item = K>>(iter: T) -> Self {
        let dates = iter.into_iter().map(|key| (key.into(), true)).collect();
        Self { dates }
    }
}

/// Row shape returned by `select=date` on the remote table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RemoteRow {
    #[serde(default)]
    pub date: Option<String>,
}

/// One persisted check: one record per checked date per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncRecord {
    pub id: u64,
    pub date: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CalendarDay {
    Empty,
    Day {
        date: NaiveDate,
        day: u32,
        is_today: bool,
        is_checked: bool,
    },
}

impl CalendarDay {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            CalendarDay::Empty => None,
            CalendarDay::Day { date, .. } => Some(*date),
        }
    }

    pub fn is_checked(&self) -> bool {
        matches!(self, CalendarDay::Day { is_checked: true, .. })
    }

    pub fn is_today(&self) -> bool {
        matches!(self, CalendarDay::Day { is_today: true, .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// Optimistically checked and acknowledged by the store.
    Checked,
    /// Date was already checked; an uncheck confirmation is now pending.
    ConfirmRequired,
    /// No active session.
    Ignored,
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub signed_in: bool,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    /// 1-based month; out-of-range values roll over into neighbouring years.
    pub month: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CalendarResponse {
    pub year: i32,
    pub month: u32,
    pub title: String,
    pub weekdays: [&'static str; 7],
    pub days: Vec<CalendarDay>,
    pub pending_confirmation: Option<NaiveDate>,
    pub loading: bool,
    pub notice: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub date: String,
    pub outcome: ToggleOutcome,
}
