// src/dag/mutator.rs

//! The only path through which a task's `dependencies` change.
//!
//! Every check runs before anything is written, so a failed call leaves the
//! list exactly as it was.

use std::collections::HashSet;
use std::fmt;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use crate::dag::cycle::would_create_cycle;
use crate::errors::{Result, TaskDagError};
use crate::model::{Task, TaskId, TaskList};
use crate::types::TaskStatus;

/// Hard upper bound on dependencies per task.
pub const MAX_DEPENDENCIES: usize = 50;

/// Tunables for dependency mutation, usually taken from `[engine]` config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyRules {
    /// Per-task dependency limit; never above [`MAX_DEPENDENCIES`].
    pub max_dependencies: usize,
    /// Emit [`DependencyWarning::AlreadyCompleted`] for completed targets.
    pub warn_on_completed_dependency: bool,
}

impl Default for DependencyRules {
    fn default() -> Self {
        Self {
            max_dependencies: MAX_DEPENDENCIES,
            warn_on_completed_dependency: true,
        }
    }
}

/// Advisory finding that does not block the mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DependencyWarning {
    AlreadyCompleted { dependency_id: TaskId },
}

impl fmt::Display for DependencyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyWarning::AlreadyCompleted { dependency_id } => write!(
                f,
                "dependency '{dependency_id}' already completed; adds no ordering constraint"
            ),
        }
    }
}

/// Result of a committed dependency change.
#[derive(Debug, Clone, Serialize)]
pub struct DependencyUpdate {
    pub task: Task,
    pub warnings: Vec<DependencyWarning>,
}

/// Replace `task_id`'s dependencies with `dependency_ids`.
///
/// Full-replace semantics: an empty vector clears all dependencies. Checks,
/// in order: the task exists, every dependency exists, no self-dependency,
/// no duplicates, the count is within the limit, and the result is acyclic.
pub fn set_dependencies(
    list: &mut TaskList,
    task_id: &str,
    dependency_ids: Vec<TaskId>,
    rules: &DependencyRules,
) -> Result<DependencyUpdate> {
    list.require_task(task_id)?;

    let missing: Vec<&str> = dependency_ids
        .iter()
        .filter(|id| !list.contains(id))
        .map(|id| id.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(TaskDagError::Validation(format!(
            "unknown dependency task id(s) in list '{}': {}",
            list.id,
            missing.join(", ")
        )));
    }

    if dependency_ids.iter().any(|id| id == task_id) {
        return Err(TaskDagError::Validation(format!(
            "task cannot depend on itself: '{task_id}'"
        )));
    }

    let mut seen: HashSet<&str> = HashSet::with_capacity(dependency_ids.len());
    if let Some(dup) = dependency_ids.iter().find(|id| !seen.insert(id.as_str())) {
        return Err(TaskDagError::Validation(format!(
            "dependency '{dup}' listed more than once for task '{task_id}'"
        )));
    }

    let limit = rules.max_dependencies.min(MAX_DEPENDENCIES);
    if dependency_ids.len() > limit {
        return Err(TaskDagError::DependencyLimitExceeded {
            task_id: task_id.to_string(),
            count: dependency_ids.len(),
            limit,
        });
    }

    if let Some(cycle) = would_create_cycle(list, task_id, &dependency_ids) {
        warn!(
            list_id = %list.id,
            task_id = %task_id,
            cycle = ?cycle,
            "rejecting dependencies: circular dependency"
        );
        return Err(TaskDagError::CircularDependency { cycle });
    }

    let warnings = if rules.warn_on_completed_dependency {
        completed_dependency_warnings(list, &dependency_ids)
    } else {
        Vec::new()
    };
    for w in &warnings {
        warn!(list_id = %list.id, task_id = %task_id, "{w}");
    }

    let now = Utc::now();
    let count = dependency_ids.len();
    let task = list.require_task_mut(task_id)?;
    task.dependencies = dependency_ids;
    task.touch(now);
    let task = task.clone();
    list.touch(now);

    #[cfg(debug_assertions)]
    assert_acyclic(list);

    info!(
        list_id = %list.id,
        task_id = %task_id,
        dependencies = count,
        version = list.version,
        "dependencies updated"
    );

    Ok(DependencyUpdate { task, warnings })
}

/// Append one dependency, going through the full validation chain.
///
/// Adding an id that is already present changes nothing.
pub fn add_dependency(
    list: &mut TaskList,
    task_id: &str,
    dependency_id: &str,
    rules: &DependencyRules,
) -> Result<DependencyUpdate> {
    let current = list.require_task(task_id)?;
    if current.dependencies().iter().any(|d| d == dependency_id) {
        return Ok(DependencyUpdate {
            task: current.clone(),
            warnings: Vec::new(),
        });
    }
    let mut deps = current.dependencies().to_vec();
    deps.push(dependency_id.to_string());
    set_dependencies(list, task_id, deps, rules)
}

/// Drop one dependency. Fails if `task_id` does not depend on it.
pub fn remove_dependency(
    list: &mut TaskList,
    task_id: &str,
    dependency_id: &str,
    rules: &DependencyRules,
) -> Result<DependencyUpdate> {
    let current = list.require_task(task_id)?;
    if !current.dependencies().iter().any(|d| d == dependency_id) {
        return Err(TaskDagError::Validation(format!(
            "task '{task_id}' does not depend on '{dependency_id}'"
        )));
    }
    let deps = current
        .dependencies()
        .iter()
        .filter(|d| *d != dependency_id)
        .cloned()
        .collect();
    set_dependencies(list, task_id, deps, rules)
}

fn completed_dependency_warnings(list: &TaskList, dependency_ids: &[TaskId]) -> Vec<DependencyWarning> {
    dependency_ids
        .iter()
        .filter(|id| {
            list.task(id)
                .is_some_and(|t| t.status() == TaskStatus::Completed)
        })
        .map(|id| DependencyWarning::AlreadyCompleted {
            dependency_id: id.clone(),
        })
        .collect()
}

/// A cycle after a validated commit is a defect in this module, not bad input.
#[cfg(debug_assertions)]
fn assert_acyclic(list: &TaskList) {
    use crate::dag::cycle::find_cycle;
    use crate::dag::DagGraph;

    if let Some(cycle) = find_cycle(&DagGraph::from_list(list)) {
        tracing::error!(list_id = %list.id, cycle = ?cycle, "dependency graph became cyclic after commit");
        panic!("dependency graph of list '{}' is cyclic after commit: {cycle:?}", list.id);
    }
}
