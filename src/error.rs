use thiserror::Error;

/// Everything that can go wrong while building, storing or scoring a task.
#[derive(Debug, Error)]
pub enum TaskError {
    /// A field value breaks a constraint, or a required field is missing.
    #[error("invalid field '{field}': {reason}")]
    Validation { field: String, reason: String },

    #[error("storage failure: {0}")]
    Persistence(#[from] rusqlite::Error),

    /// Importance was requested for a task that cannot be scored.
    #[error("cannot score task: {0}")]
    ScoringPrecondition(String),

    /// Importance was requested at the exact instant the task falls due.
    #[error("task {} is due right now", display_id(.id))]
    DivideByZeroAtDeadline { id: Option<i64> },
}

impl TaskError {
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        TaskError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

fn display_id(id: &Option<i64>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "(unsaved)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, TaskError>;
