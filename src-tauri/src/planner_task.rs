use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

/// Opaque task identifier; the backend sends numeric ids but strings are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub(crate) enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(id) => write!(f, "{id}"),
            TaskId::Text(id) => f.write_str(id),
        }
    }
}

/// Deadline as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum TaskDeadline {
    EpochMillis(i64),
    Text(String),
    Parts(Vec<i64>),
}

impl TaskDeadline {
    /// Resolves the deadline to an instant. Zone-less values are local time.
    pub(crate) fn to_utc(&self) -> Option<DateTime<Utc>> {
        match self {
            TaskDeadline::EpochMillis(millis) => Utc.timestamp_millis_opt(*millis).single(),
            TaskDeadline::Text(raw) => parse_deadline_text(raw),
            TaskDeadline::Parts(parts) => parse_deadline_parts(parts),
        }
    }
}

fn parse_deadline_text(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(millis) = raw.parse::<i64>() {
        return Utc.timestamp_millis_opt(millis).single();
    }

    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return local_to_utc(naive);
    }
    // Date-only ISO strings are UTC midnight, not local midnight.
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn parse_deadline_parts(parts: &[i64]) -> Option<DateTime<Utc>> {
    if parts.len() < 3 {
        return None;
    }
    let part = |index: usize| parts.get(index).copied().unwrap_or(0);
    let date = NaiveDate::from_ymd_opt(
        i32::try_from(part(0)).ok()?,
        u32::try_from(part(1)).ok()?,
        u32::try_from(part(2)).ok()?,
    )?;
    let naive = date.and_hms_opt(
        u32::try_from(part(3)).ok()?,
        u32::try_from(part(4)).ok()?,
        u32::try_from(part(5)).ok()?,
    )?;
    local_to_utc(naive)
}

fn local_to_utc(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Read-only view of a backend task; unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct PlannerTask {
    pub(crate) id: Option<TaskId>,
    pub(crate) title: Option<String>,
    pub(crate) deadline: Option<TaskDeadline>,
    pub(crate) status: Option<String>,
}

impl PlannerTask {
    /// Pending (absent or empty status counts as pending) and carrying a
    /// deadline. The status is compared untrimmed.
    pub(crate) fn is_notification_candidate(&self) -> bool {
        if self.deadline.is_none() {
            return false;
        }
        self.status
            .as_deref()
            .filter(|status| !status.is_empty())
            .unwrap_or("PENDING")
            .eq_ignore_ascii_case("PENDING")
    }

    pub(crate) fn display_title<'a>(&'a self, untitled: &'a str) -> &'a str {
        self.title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(untitled)
    }
}
