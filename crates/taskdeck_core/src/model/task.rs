use crate::error::AppError;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn parse(raw: &str) -> Option<Priority> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

/// A task as serialized by the remote service. `created_at` and
/// `completed_at` are server bookkeeping; the client carries them
/// through but never interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    pub done: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl Task {
    /// True only while the task is incomplete and its due date has
    /// passed as of `now`. Unparseable due dates never count.
    pub fn overdue_at(&self, now: OffsetDateTime) -> bool {
        if self.done {
            return false;
        }
        match self.due_date.as_deref().and_then(due_moment) {
            Some(due) => due < now,
            None => false,
        }
    }
}

/// Create payload. `priority` and `due_date` are omitted from the body
/// when unset so the server applies its own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
}

impl TaskDraft {
    pub fn named<N: Into<String>>(name: N) -> Self {
        TaskDraft {
            name: name.into(),
            ..TaskDraft::default()
        }
    }
}

/// Partial update. `due_date: Some(None)` clears the stored due date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<Option<String>>,
}

impl TaskUpdate {
    pub fn rename<N: Into<String>>(name: N) -> Self {
        TaskUpdate {
            name: Some(name.into()),
            ..TaskUpdate::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.priority.is_none() && self.due_date.is_none()
    }
}

const DATE_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Validate a user-supplied due date (`YYYY-MM-DD` or RFC3339) and
/// return it trimmed for submission.
pub fn normalize_due_date(raw: &str) -> Result<String, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::invalid_input("due date is required"));
    }

    if OffsetDateTime::parse(trimmed, &Rfc3339).is_ok() || Date::parse(trimmed, DATE_FORMAT).is_ok()
    {
        return Ok(trimmed.to_string());
    }

    Err(AppError::invalid_input(
        "due date must be YYYY-MM-DD or RFC3339",
    ))
}

/// Interpret a stored due date as a moment in time. Date-only values
/// count from UTC midnight.
pub fn due_moment(raw: &str) -> Option<OffsetDateTime> {
    if let Ok(parsed) = OffsetDateTime::parse(raw, &Rfc3339) {
        return Some(parsed);
    }
    Date::parse(raw, DATE_FORMAT)
        .ok()
        .map(|date| date.midnight().assume_utc())
}
