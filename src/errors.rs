// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every variant except [`TaskDagError::VersionConflict`] is a local
//! validation failure, detected before anything is mutated.

use thiserror::Error;

use crate::model::{ListId, TaskId};
use crate::types::TaskStatus;

#[derive(Error, Debug)]
pub enum TaskDagError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Task '{task_id}' has {count} dependencies; the limit is {limit}")]
    DependencyLimitExceeded {
        task_id: TaskId,
        count: usize,
        limit: usize,
    },

    #[error("Circular dependency detected: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<TaskId> },

    #[error(
        "Invalid status transition from {current} to {target} (valid: {})",
        format_statuses(.valid_transitions)
    )]
    StatusTransition {
        current: TaskStatus,
        target: TaskStatus,
        valid_transitions: Vec<TaskStatus>,
    },

    #[error("Task '{task_id}' cannot be completed: unmet exit criteria {unmet:?}")]
    ExitCriteriaNotMet { task_id: TaskId, unmet: Vec<String> },

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("List not found: {0}")]
    ListNotFound(ListId),

    #[error("Exit criterion '{criterion_id}' not found on task '{task_id}'")]
    ExitCriterionNotFound {
        task_id: TaskId,
        criterion_id: String,
    },

    #[error("Version conflict on list '{list_id}': cannot save version {attempted} over stored version {stored}")]
    VersionConflict {
        list_id: ListId,
        attempted: u64,
        stored: u64,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskDagError {
    /// Only a lost optimistic-concurrency race is worth retrying, after the
    /// caller reloads the list.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TaskDagError::VersionConflict { .. })
    }
}

fn format_statuses(statuses: &[TaskStatus]) -> String {
    if statuses.is_empty() {
        return "none".to_string();
    }
    statuses
        .iter()
        .map(|s| s.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, TaskDagError>;
