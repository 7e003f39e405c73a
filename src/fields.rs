//! Typed construction of a task from raw, user-typed field values.
//!
//! Each value arrives as text keyed by its field name (see
//! [`crate::store::FIELD_NAMES`]). Formats:
//!
//! - `due_date`: `YYYY-MM-DD HH:MM`, local time
//! - `time_per_week`: `h,m` or `h,m,s`
//! - `absolute_date`: `true/false`, `yes/no`, `y/n` or `1/0`
//! - `extra`: a JSON object

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDateTime, NaiveTime, TimeZone};
use serde_json::Value;

use crate::error::{Result, TaskError};
use crate::model::{Task, TaskKind, MAX_DESCRIPTION_CHARS};
use crate::store::FIELD_NAMES;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Build an unsaved task from raw field values.
pub fn parse_task(fields: &BTreeMap<String, String>) -> Result<Task> {
    for name in fields.keys() {
        if name == "id" {
            return Err(TaskError::validation("id", "assigned by the store"));
        }
        if !FIELD_NAMES.contains(&name.as_str()) {
            return Err(TaskError::validation(name, "unknown field"));
        }
    }
    let raw = |name: &str| fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty());

    let kind = match raw("kind") {
        Some(kind) => TaskKind::parse(&kind.to_lowercase())
            .ok_or_else(|| TaskError::validation("kind", format!("expected deadline or hobby, got '{}'", kind)))?,
        None => TaskKind::Deadline,
    };
    let value = parse_integer("value", raw("value"))?
        .ok_or_else(|| TaskError::validation("value", "required"))?;
    let due_date_importance = parse_integer("due_date_importance", raw("due_date_importance"))?
        .ok_or_else(|| TaskError::validation("due_date_importance", "required"))?;

    let mut task = Task::new(kind, value, due_date_importance);
    if let Some(rate) = parse_integer(
        "past_due_importance_decrease_rate",
        raw("past_due_importance_decrease_rate"),
    )? {
        task.past_due_importance_decrease_rate = rate;
    }
    task.due_date = raw("due_date").map(parse_due_date).transpose()?;
    task.time_per_week = raw("time_per_week").map(parse_time_per_week).transpose()?;
    if let Some(flag) = raw("absolute_date") {
        task.absolute_date = parse_flag("absolute_date", flag)?;
    }
    if let Some(extra) = raw("extra") {
        task.extra = parse_extra(extra)?;
    }
    if let Some(description) = fields.get("description") {
        let length = description.chars().count();
        if length > MAX_DESCRIPTION_CHARS {
            return Err(TaskError::validation(
                "description",
                format!("{} characters, at most {} allowed", length, MAX_DESCRIPTION_CHARS),
            ));
        }
        task.description = description.clone();
    }
    Ok(task)
}

fn parse_integer(field: &str, raw: Option<&str>) -> Result<Option<i64>> {
    raw.map(|s| {
        s.parse::<i64>()
            .map_err(|_| TaskError::validation(field, format!("'{}' is not an integer", s)))
    })
    .transpose()
}

pub fn parse_due_date(raw: &str) -> Result<DateTime<Local>> {
    let naive = NaiveDateTime::parse_from_str(raw, DATE_FORMAT).map_err(|err| {
        TaskError::validation("due_date", format!("'{}' does not match {}: {}", raw, DATE_FORMAT, err))
    })?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| TaskError::validation("due_date", format!("'{}' does not exist in the local time zone", raw)))
}

pub fn parse_time_per_week(raw: &str) -> Result<NaiveTime> {
    let invalid = || TaskError::validation("time_per_week", format!("'{}' is not h,m or h,m,s", raw));
    let parts = raw
        .split(',')
        .map(|part| part.trim().parse::<u32>().map_err(|_| invalid()))
        .collect::<Result<Vec<u32>>>()?;
    let (h, m, s) = match parts.as_slice() {
        [h, m] => (*h, *m, 0),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(invalid()),
    };
    NaiveTime::from_hms_opt(h, m, s).ok_or_else(invalid)
}

pub fn parse_flag(field: &str, raw: &str) -> Result<bool> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" => Ok(true),
        "false" | "no" | "n" | "0" => Ok(false),
        _ => Err(TaskError::validation(field, format!("'{}' is not a boolean", raw))),
    }
}

pub fn parse_extra(raw: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|err| TaskError::validation("extra", format!("invalid JSON: {}", err)))?;
    if !value.is_object() {
        return Err(TaskError::validation("extra", "expected a JSON object"));
    }
    Ok(value)
}
