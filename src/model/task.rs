// src/model/task.rs

//! Task, exit-criteria and priority types.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TaskDagError};
use crate::model::TaskId;
use crate::types::TaskStatus;

/// Task priority in `1..=5`; higher is more urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Priority(u8);

impl Priority {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(TaskDagError::Validation(format!(
                "priority must be between {} and {} (got {value})",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(3)
    }
}

impl TryFrom<u8> for Priority {
    type Error = TaskDagError;

    fn try_from(value: u8) -> Result<Self> {
        Priority::new(value)
    }
}

impl From<Priority> for u8 {
    fn from(p: Priority) -> u8 {
        p.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One checklist entry that must be met before its task can complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitCriteria {
    pub id: String,
    pub description: String,
    pub is_met: bool,
    #[serde(default)]
    pub met_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl ExitCriteria {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            description: description.into(),
            is_met: false,
            met_at: None,
            notes: None,
        }
    }
}

/// A unit of work inside a [`TaskList`](crate::model::TaskList).
///
/// `dependencies`, `status` and `exit_criteria` are read-only from outside
/// the crate: they change only through [`crate::dag::mutator`] and
/// [`crate::lifecycle`], which keep the list invariants intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub(crate) status: TaskStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Estimated effort in minutes.
    #[serde(default)]
    pub estimated_duration: Option<u32>,
    #[serde(default)]
    pub(crate) dependencies: Vec<TaskId>,
    #[serde(default)]
    pub(crate) exit_criteria: Vec<ExitCriteria>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub(crate) completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub(crate) fn from_new(id: TaskId, new: NewTask, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: new.title,
            description: new.description,
            status: TaskStatus::Pending,
            priority: new.priority,
            tags: new.tags,
            estimated_duration: new.estimated_duration,
            dependencies: Vec::new(),
            exit_criteria: Vec::new(),
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    /// Ids this task waits on, in insertion order.
    pub fn dependencies(&self) -> &[TaskId] {
        &self.dependencies
    }

    pub fn exit_criteria(&self) -> &[ExitCriteria] {
        &self.exit_criteria
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Duration used as the critical-path weight; unset counts as zero.
    pub fn duration_or_zero(&self) -> u64 {
        u64::from(self.estimated_duration.unwrap_or(0))
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Input for [`TaskList::add_task`](crate::model::TaskList::add_task).
///
/// When `id` is `None` a random UUID is assigned.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub id: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub tags: BTreeSet<String>,
    pub estimated_duration: Option<u32>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<TaskId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.estimated_duration = Some(minutes);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }
}

/// Partial update of a task's plain fields.
///
/// Status, dependencies and exit criteria have their own gated operations.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<BTreeSet<String>>,
    /// `Some(None)` clears the estimate.
    pub estimated_duration: Option<Option<u32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_rejects_out_of_range() {
        assert!(Priority::new(0).is_err());
        assert!(Priority::new(6).is_err());
        assert_eq!(Priority::new(5).unwrap().value(), 5);
    }

    #[test]
    fn priority_deserialization_is_validated() {
        let ok: Priority = serde_json::from_str("4").unwrap();
        assert_eq!(ok.value(), 4);
        assert!(serde_json::from_str::<Priority>("9").is_err());
    }

    #[test]
    fn new_task_starts_pending_and_unlinked() {
        let now = Utc::now();
        let task = Task::from_new("t1".into(), NewTask::new("write docs").with_duration(15), now);
        assert_eq!(task.status(), TaskStatus::Pending);
        assert!(task.dependencies().is_empty());
        assert!(task.exit_criteria().is_empty());
        assert_eq!(task.duration_or_zero(), 15);
        assert_eq!(task.completed_at(), None);
    }
}
