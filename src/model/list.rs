// src/model/list.rs

//! The `TaskList` aggregate: owns its tasks and the version counter.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dag::cycle::find_cycle;
use crate::dag::DagGraph;
use crate::errors::{Result, TaskDagError};
use crate::lifecycle::exit_criteria::unmet_criteria;
use crate::model::task::{NewTask, Task, TaskUpdate};
use crate::model::{ListId, TaskId};
use crate::types::TaskStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub id: ListId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_tag: Option<String>,
    #[serde(default)]
    pub(crate) tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped once per committed mutation; used for optimistic concurrency.
    #[serde(default)]
    pub version: u64,
}

impl TaskList {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), title)
    }

    pub fn with_id(id: impl Into<ListId>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            project_tag: None,
            tasks: Vec::new(),
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.task(id).is_some()
    }

    /// Like [`TaskList::task`] but fails with `TaskNotFound`.
    pub fn require_task(&self, id: &str) -> Result<&Task> {
        self.task(id)
            .ok_or_else(|| TaskDagError::TaskNotFound(id.to_string()))
    }

    pub(crate) fn require_task_mut(&mut self, id: &str) -> Result<&mut Task> {
        self.task_mut(id)
            .ok_or_else(|| TaskDagError::TaskNotFound(id.to_string()))
    }

    pub fn total_items(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_items(&self) -> usize {
        self.tasks
            .iter()
            .filter(|t| t.status == TaskStatus::Completed)
            .count()
    }

    /// Completed share of all tasks as a percentage; an empty list is at 0.
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed_items() as f64 / self.tasks.len() as f64 * 100.0
    }

    /// Append a new pending task with no dependencies and no exit criteria.
    pub fn add_task(&mut self, new: NewTask) -> Result<&Task> {
        if new.title.trim().is_empty() {
            return Err(TaskDagError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
        let id = match new.id.clone() {
            Some(id) if id.trim().is_empty() => {
                return Err(TaskDagError::Validation(
                    "task id must not be empty".to_string(),
                ));
            }
            Some(id) => id,
            None => uuid::Uuid::new_v4().to_string(),
        };
        if self.contains(&id) {
            return Err(TaskDagError::Validation(format!(
                "task '{id}' already exists in list '{}'",
                self.id
            )));
        }

        let now = Utc::now();
        self.tasks.push(Task::from_new(id, new, now));
        self.touch(now);

        let task = &self.tasks[self.tasks.len() - 1];
        debug!(list_id = %self.id, task_id = %task.id, "task added");
        Ok(task)
    }

    /// Remove a task and strip its id from every other task's dependencies.
    ///
    /// Dropping edges can never introduce a cycle, so no graph check runs.
    pub fn remove_task(&mut self, id: &str) -> Result<Task> {
        let idx = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| TaskDagError::TaskNotFound(id.to_string()))?;

        let now = Utc::now();
        let removed = self.tasks.remove(idx);
        for task in self.tasks.iter_mut() {
            let before = task.dependencies.len();
            task.dependencies.retain(|dep| dep != id);
            if task.dependencies.len() != before {
                task.touch(now);
                debug!(
                    list_id = %self.id,
                    task_id = %task.id,
                    removed = %id,
                    "dropped dangling dependency"
                );
            }
        }
        self.touch(now);
        Ok(removed)
    }

    /// Update plain task fields (title, description, priority, tags, estimate).
    pub fn update_task(&mut self, id: &str, update: TaskUpdate) -> Result<&Task> {
        if let Some(title) = &update.title {
            if title.trim().is_empty() {
                return Err(TaskDagError::Validation(
                    "task title must not be empty".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let task = self.require_task_mut(id)?;
        if let Some(title) = update.title {
            task.title = title;
        }
        if let Some(description) = update.description {
            task.description = description;
        }
        if let Some(priority) = update.priority {
            task.priority = priority;
        }
        if let Some(tags) = update.tags {
            task.tags = tags;
        }
        if let Some(duration) = update.estimated_duration {
            task.estimated_duration = duration;
        }
        task.touch(now);
        self.touch(now);
        self.require_task(id)
    }

    /// Record a committed mutation: bump the version and `updated_at`.
    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }

    /// Re-check the structural invariants of the aggregate.
    ///
    /// Used on lists coming back from storage, where the mutators could not
    /// guard the data.
    pub fn validate_invariants(&self, max_dependencies: usize) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for task in &self.tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(TaskDagError::Validation(format!(
                    "duplicate task id '{}' in list '{}'",
                    task.id, self.id
                )));
            }
        }

        for task in &self.tasks {
            if task.dependencies.len() > max_dependencies {
                return Err(TaskDagError::DependencyLimitExceeded {
                    task_id: task.id.clone(),
                    count: task.dependencies.len(),
                    limit: max_dependencies,
                });
            }
            for dep in &task.dependencies {
                if dep == &task.id {
                    return Err(TaskDagError::Validation(format!(
                        "task '{}' depends on itself",
                        task.id
                    )));
                }
                if !seen.contains(dep.as_str()) {
                    return Err(TaskDagError::Validation(format!(
                        "task '{}' depends on unknown task '{}'",
                        task.id, dep
                    )));
                }
            }
            if task.status == TaskStatus::Completed {
                let unmet = unmet_criteria(task);
                if !unmet.is_empty() {
                    return Err(TaskDagError::ExitCriteriaNotMet {
                        task_id: task.id.clone(),
                        unmet,
                    });
                }
            }
        }

        if let Some(cycle) = find_cycle(&DagGraph::from_list(self)) {
            return Err(TaskDagError::CircularDependency { cycle });
        }

        Ok(())
    }
}
