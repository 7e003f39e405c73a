use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration as STDDuration;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use humantime::format_duration;
use prettytable::Table;
use tracing::info;

use crate::error::TaskError;
use crate::fields::{parse_task, DATE_FORMAT};
use crate::importance::importance;
use crate::model::Task;
use crate::store::TaskStore;

/// A task together with its importance at the moment it was listed.
#[derive(Debug)]
pub struct Scored {
    pub task: Task,
    pub importance: std::result::Result<f64, TaskError>,
}

impl Scored {
    /// Tasks due this very instant first, then by importance, unscorable last.
    fn rank_cmp(&self, other: &Scored) -> Ordering {
        fn class(s: &Scored) -> (u8, f64) {
            match &s.importance {
                Err(TaskError::DivideByZeroAtDeadline { .. }) => (0, 0.0),
                Ok(score) => (1, -score),
                Err(_) => (2, 0.0),
            }
        }
        let (a, b) = (class(self), class(other));
        a.0.cmp(&b.0)
            .then(a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
            .then(self.task.id().cmp(&other.task.id()))
    }
}

/// Score every task at `now`. Keeps the store order unless `by_importance`.
pub fn score(tasks: Vec<Task>, now: DateTime<Local>, by_importance: bool) -> Vec<Scored> {
    let mut scored: Vec<Scored> = tasks
        .into_iter()
        .map(|task| {
            let importance = importance(&task, now);
            Scored { task, importance }
        })
        .collect();
    if by_importance {
        scored.sort_by(|a, b| a.rank_cmp(b));
    }
    scored
}

/// Build a task from raw field values and store it.
pub fn add_task(store: &TaskStore, fields: BTreeMap<String, String>) -> Result<()> {
    let mut task = parse_task(&fields).context("Failed to read the task fields.")?;
    let id = store
        .create(&mut task)
        .context("Failed to insert task to database.")?;
    info!(id, kind = task.kind.as_str(), "added task");
    println!("{}. {}", id, task.description);
    Ok(())
}

pub fn list(store: &TaskStore, by_importance: bool) -> Result<()> {
    let tasks = store
        .list_all_ordered()
        .context("Failed to fetch tasks from database.")?;
    if tasks.is_empty() {
        println!("No tasks. Use 'urgent add' to add some.");
        return Ok(());
    }

    let now = Local::now();
    let mut table = Table::new();
    table.add_row(row!["id", "kind", "task", "due", "time left", "importance"]);
    for scored in score(tasks, now, by_importance) {
        table.add_row(row![
            scored.task.id().map(|id| id.to_string()).unwrap_or_default(),
            scored.task.kind.as_str(),
            textwrap::fill(&scored.task.description, 40),
            fmt_due_date(&scored.task),
            fmt_time_left(&scored.task, now),
            fmt_importance(&scored.importance)
        ]);
    }
    table.printstd();
    Ok(())
}

/// Print the task that matters most right now.
pub fn next(store: &TaskStore) -> Result<()> {
    let tasks = store
        .list_all_ordered()
        .context("Failed to fetch tasks from database.")?;
    let now = Local::now();
    match score(tasks, now, true).into_iter().next() {
        Some(top) => println!(
            "{}. {} ({}, {})",
            top.task.id().unwrap_or_default(),
            top.task.description,
            fmt_time_left(&top.task, now),
            fmt_importance(&top.importance)
        ),
        None => println!("No tasks. Use 'urgent add' to add some."),
    }
    Ok(())
}

/// Remove a set of tasks. Ids that do not exist are skipped.
pub fn remove_tasks(store: &mut TaskStore, ids: Vec<i64>) -> Result<()> {
    for task in remove(store, ids)? {
        println!("removed {}. {}", task.id().unwrap_or_default(), task.description);
    }
    Ok(())
}

/// Delete the distinct ids in `ids` and return the tasks that existed.
fn remove(store: &mut TaskStore, ids: Vec<i64>) -> Result<Vec<Task>> {
    let ids: Vec<i64> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    let mut found = Vec::new();
    for id in &ids {
        if let Some(task) = store.get(*id).context("Failed to fetch task from database.")? {
            found.push(task);
        }
    }
    let removed = store
        .delete_by_ids(&ids)
        .context("Failed to remove tasks from database.")?;
    info!(requested = ids.len(), removed, "removed tasks");
    Ok(found)
}

/// Print the task field names, one per line, as the store reports them.
pub fn fields(store: &TaskStore) -> Result<()> {
    let columns = store
        .columns()
        .context("Failed to read the task table layout.")?;
    for name in columns {
        println!("{}", name);
    }
    Ok(())
}

fn fmt_due_date(task: &Task) -> String {
    task.due_date
        .map(|due| due.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn fmt_time_left(task: &Task, now: DateTime<Local>) -> String {
    match task.time_left(now) {
        Some(left) => {
            let minutes = left.num_minutes().unsigned_abs();
            let span = format_duration(STDDuration::from_secs(minutes * 60));
            if task.past_due(now) {
                format!("{} overdue", span)
            } else {
                span.to_string()
            }
        }
        None => "-".to_string(),
    }
}

fn fmt_importance(importance: &std::result::Result<f64, TaskError>) -> String {
    match importance {
        Ok(score) => format!("{:.3}", score),
        Err(TaskError::DivideByZeroAtDeadline { .. }) => "due now".to_string(),
        Err(err) => err.to_string(),
    }
}
