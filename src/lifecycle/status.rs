// src/lifecycle/status.rs

//! Task status state machine.
//!
//! ```text
//! pending     -> in_progress | blocked | cancelled
//! in_progress -> completed | blocked | pending | cancelled
//! blocked     -> pending | in_progress | cancelled
//! completed   -> (terminal)
//! cancelled   -> (terminal)
//! ```
//!
//! Entering `completed` additionally requires every exit criterion to be
//! met.

use chrono::Utc;
use tracing::{info, warn};

use crate::errors::{Result, TaskDagError};
use crate::lifecycle::exit_criteria::unmet_criteria;
use crate::model::{Task, TaskList};
use crate::types::TaskStatus;

impl TaskStatus {
    /// Statuses reachable from `self` in one step.
    pub fn valid_transitions(self) -> &'static [TaskStatus] {
        use TaskStatus::*;
        match self {
            Pending => &[InProgress, Blocked, Cancelled],
            InProgress => &[Completed, Blocked, Pending, Cancelled],
            Blocked => &[Pending, InProgress, Cancelled],
            Completed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, target: TaskStatus) -> bool {
        self.valid_transitions().contains(&target)
    }
}

/// Check a transition against the table and the exit-criteria gate.
pub fn check_transition(task: &Task, target: TaskStatus) -> Result<()> {
    let current = task.status();
    if !current.can_transition_to(target) {
        return Err(TaskDagError::StatusTransition {
            current,
            target,
            valid_transitions: current.valid_transitions().to_vec(),
        });
    }

    if target == TaskStatus::Completed {
        let unmet = unmet_criteria(task);
        if !unmet.is_empty() {
            return Err(TaskDagError::ExitCriteriaNotMet {
                task_id: task.id.clone(),
                unmet,
            });
        }
    }

    Ok(())
}

/// Move a task to `target`, stamping `completed_at` on completion.
///
/// Nothing changes when the transition is rejected.
pub fn set_task_status(list: &mut TaskList, task_id: &str, target: TaskStatus) -> Result<Task> {
    let task = list.require_task(task_id)?;
    let current = task.status();
    if let Err(e) = check_transition(task, target) {
        warn!(list_id = %list.id, task_id = %task_id, %current, %target, "status change rejected: {e}");
        return Err(e);
    }

    let now = Utc::now();
    let task = list.require_task_mut(task_id)?;
    task.status = target;
    if target == TaskStatus::Completed {
        task.completed_at = Some(now);
    }
    task.touch(now);
    let task = task.clone();
    list.touch(now);

    info!(
        list_id = %list.id,
        task_id = %task_id,
        from = %current,
        to = %target,
        version = list.version,
        "task status changed"
    );
    Ok(task)
}
