use chrono::{DateTime, Duration, Local, NaiveTime, Timelike};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde_json::{Map, Value};

use crate::error::{Result, TaskError};

/// Longest description the store accepts, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 3000;

/// How a task is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Urgency grows towards the due date and decays after it.
    Deadline,
    /// Recurring effort, weighted by the time spent on it each week.
    Hobby,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Deadline => "deadline",
            TaskKind::Hobby => "hobby",
        }
    }

    pub fn parse(s: &str) -> Option<TaskKind> {
        match s {
            "deadline" => Some(TaskKind::Deadline),
            "hobby" => Some(TaskKind::Hobby),
            _ => None,
        }
    }
}

impl ToSql for TaskKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TaskKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        TaskKind::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown task kind '{}'", s).into()))
    }
}

/// A single task, saved as an entry in the task table.
///
/// The id stays unset until the store persists the task, and is never
/// changed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: Option<i64>,
    pub kind: TaskKind,
    pub value: i64,
    pub due_date: Option<DateTime<Local>>,
    pub due_date_importance: i64,
    pub past_due_importance_decrease_rate: i64,
    pub description: String,
    pub time_per_week: Option<NaiveTime>,
    /// Stored for later use; scoring ignores it.
    pub absolute_date: bool,
    pub extra: Value,
}

impl Task {
    pub fn new(kind: TaskKind, value: i64, due_date_importance: i64) -> Task {
        Task {
            id: None,
            kind,
            value,
            due_date: None,
            due_date_importance,
            past_due_importance_decrease_rate: 1,
            description: String::new(),
            time_per_week: None,
            absolute_date: false,
            extra: Value::Object(Map::new()),
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    /// Set the store-assigned identifier. Fails if one is already set.
    pub(crate) fn assign_id(&mut self, id: i64) -> Result<()> {
        if let Some(existing) = self.id {
            return Err(TaskError::validation(
                "id",
                format!("already assigned ({})", existing),
            ));
        }
        self.id = Some(id);
        Ok(())
    }

    /// Signed time until the due date; negative once overdue.
    pub fn time_left(&self, now: DateTime<Local>) -> Option<Duration> {
        self.due_date.map(|due| due - now)
    }

    /// Same as `time_left`, in fractional hours (millisecond precision).
    pub fn time_left_hours(&self, now: DateTime<Local>) -> Option<f64> {
        self.time_left(now)
            .map(|left| left.num_milliseconds() as f64 / 3_600_000.0)
    }

    pub fn past_due(&self, now: DateTime<Local>) -> bool {
        matches!(self.time_left_hours(now), Some(hours) if hours < 0.0)
    }

    /// Weekly effort read as a duration, in fractional hours.
    pub fn time_per_week_hours(&self) -> Option<f64> {
        self.time_per_week.map(|t| {
            t.hour() as f64 + t.minute() as f64 / 60.0 + t.second() as f64 / 3600.0
        })
    }
}
