use std::path::Path;

use rusqlite::types::Type;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::debug;

use crate::error::{Result, TaskError};
use crate::model::{Task, MAX_DESCRIPTION_CHARS};

/// Names of the task fields, in column order.
pub const FIELD_NAMES: &[&str] = &[
    "id",
    "kind",
    "value",
    "due_date",
    "due_date_importance",
    "past_due_importance_decrease_rate",
    "description",
    "time_per_week",
    "absolute_date",
    "extra",
];

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS task (
                  id                                 INTEGER PRIMARY KEY AUTOINCREMENT,
                  kind                               TEXT NOT NULL DEFAULT 'deadline',
                  value                              INTEGER NOT NULL,
                  due_date                           TEXT,
                  due_date_importance                INTEGER NOT NULL,
                  past_due_importance_decrease_rate  INTEGER NOT NULL,
                  description                        TEXT NOT NULL CHECK (length(description) <= 3000),
                  time_per_week                      TEXT,
                  absolute_date                      INTEGER NOT NULL DEFAULT 0,
                  extra                              TEXT NOT NULL DEFAULT '{}'
                  )";

const INSERT_TASK: &str = "INSERT INTO task (kind, value, due_date, due_date_importance, past_due_importance_decrease_rate, description, time_per_week, absolute_date, extra) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

/// Ids bound per DELETE statement, well below SQLite's variable limit.
const DELETE_CHUNK: usize = 500;

const SELECT_TASKS: &str = "SELECT id, kind, value, due_date, due_date_importance, past_due_importance_decrease_rate, description, time_per_week, absolute_date, extra FROM task";

/// Handle on the task database. Open it once and pass it to whoever needs it.
pub struct TaskStore {
    db: Connection,
}

impl TaskStore {
    /// Open the store at `path`, creating the file and table if they do not exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<TaskStore> {
        let path = path.as_ref();
        debug!(path = %path.display(), "opening task store");
        TaskStore::init(Connection::open(path)?)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<TaskStore> {
        TaskStore::init(Connection::open_in_memory()?)
    }

    fn init(db: Connection) -> Result<TaskStore> {
        db.execute(SCHEMA, [])?;
        Ok(TaskStore { db })
    }

    pub fn close(self) -> Result<()> {
        self.db.close().map_err(|(_, err)| TaskError::from(err))
    }

    /// Column names as reported by the live table.
    pub fn columns(&self) -> Result<Vec<String>> {
        let mut stmt = self.db.prepare("SELECT name FROM pragma_table_info('task') ORDER BY cid")?;
        let names = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut columns = Vec::new();
        for name in names {
            columns.push(name?);
        }
        Ok(columns)
    }

    /// Persist `task`, assign its id and return it.
    pub fn create(&self, task: &mut Task) -> Result<i64> {
        if task.id().is_some() {
            return Err(TaskError::validation("id", "task is already stored"));
        }
        let length = task.description.chars().count();
        if length > MAX_DESCRIPTION_CHARS {
            return Err(TaskError::validation(
                "description",
                format!("{} characters, at most {} allowed", length, MAX_DESCRIPTION_CHARS),
            ));
        }

        self.db.execute(
            INSERT_TASK,
            params![
                task.kind,
                task.value,
                task.due_date,
                task.due_date_importance,
                task.past_due_importance_decrease_rate,
                task.description,
                task.time_per_week,
                task.absolute_date,
                task.extra,
            ],
        )?;
        let id = self.db.last_insert_rowid();
        task.assign_id(id)?;
        debug!(id, "created task");
        Ok(id)
    }

    /// Every task, by ascending id.
    pub fn list_all_ordered(&self) -> Result<Vec<Task>> {
        let mut stmt = self.db.prepare(&format!("{} ORDER BY id", SELECT_TASKS))?;
        let mapped_rows = stmt.query_map([], |row| task_from_row(row))?;

        let mut tasks = Vec::new();
        for task in mapped_rows {
            tasks.push(task?);
        }
        debug!(count = tasks.len(), "listed tasks");
        Ok(tasks)
    }

    pub fn get(&self, id: i64) -> Result<Option<Task>> {
        let task = self
            .db
            .query_row(&format!("{} WHERE id = ?1", SELECT_TASKS), params![id], |row| {
                task_from_row(row)
            })
            .optional()?;
        Ok(task)
    }

    /// Remove every task whose id is in `ids`, all at once or not at all.
    /// Unknown ids are ignored. Returns the number of tasks removed.
    pub fn delete_by_ids(&mut self, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let tx = self.db.transaction()?;
        let mut removed = 0;
        for chunk in ids.chunks(DELETE_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            removed += tx.execute(
                &format!("DELETE FROM task WHERE id IN ({})", placeholders),
                params_from_iter(chunk.iter()),
            )?;
        }
        tx.commit()?;
        debug!(requested = ids.len(), removed, "deleted tasks");
        Ok(removed)
    }
}

/// Build a task from a row in `FIELD_NAMES` order.
fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    let mut task = Task::new(row.get(1)?, row.get(2)?, row.get(4)?);
    task.due_date = row.get(3)?;
    task.past_due_importance_decrease_rate = row.get(5)?;
    task.description = row.get(6)?;
    task.time_per_week = row.get(7)?;
    task.absolute_date = row.get(8)?;
    task.extra = row.get(9)?;
    task.assign_id(row.get(0)?)
        .map_err(|err| rusqlite::Error::FromSqlConversionFailure(0, Type::Integer, Box::new(err)))?;
    Ok(task)
}
