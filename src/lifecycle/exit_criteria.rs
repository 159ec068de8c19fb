// src/lifecycle/exit_criteria.rs

//! Exit-criteria checklist gating task completion.

use chrono::Utc;
use tracing::{debug, info};

use crate::errors::{Result, TaskDagError};
use crate::model::{ExitCriteria, Task, TaskList};
use crate::types::TaskStatus;

/// True when the checklist is empty or every entry is met.
pub fn are_all_criteria_met(task: &Task) -> bool {
    task.exit_criteria().iter().all(|c| c.is_met)
}

/// Descriptions of the criteria still unmet, in checklist order.
pub fn unmet_criteria(task: &Task) -> Vec<String> {
    task.exit_criteria()
        .iter()
        .filter(|c| !c.is_met)
        .map(|c| c.description.clone())
        .collect()
}

/// Met share of the checklist as a percentage; an empty checklist is 100.
pub fn progress(task: &Task) -> f64 {
    let total = task.exit_criteria().len();
    if total == 0 {
        return 100.0;
    }
    let met = task.exit_criteria().iter().filter(|c| c.is_met).count();
    met as f64 / total as f64 * 100.0
}

/// Mark one criterion met and stamp `met_at`.
///
/// Idempotent: an already-met criterion keeps its original `met_at`.
/// `notes`, when given, replace the stored notes. Returns whether anything
/// changed.
pub fn mark_criterion_met(task: &mut Task, criterion_id: &str, notes: Option<String>) -> Result<bool> {
    let now = Utc::now();
    let task_id = task.id.clone();
    let criterion = find_mut(&mut task.exit_criteria, &task_id, criterion_id)?;

    let changed = !criterion.is_met || (notes.is_some() && criterion.notes != notes);
    if !criterion.is_met {
        criterion.is_met = true;
        criterion.met_at = Some(now);
    }
    if notes.is_some() {
        criterion.notes = notes;
    }
    if changed {
        task.touch(now);
    }
    Ok(changed)
}

/// Partial update of one criterion.
#[derive(Debug, Clone, Default)]
pub struct CriterionUpdate {
    pub is_met: Option<bool>,
    pub notes: Option<String>,
}

/// Replace a task's checklist with fresh, unmet criteria.
///
/// Rejected on completed tasks: a completed task's checklist is frozen.
pub fn set_exit_criteria(list: &mut TaskList, task_id: &str, descriptions: Vec<String>) -> Result<Task> {
    if let Some(blank) = descriptions.iter().position(|d| d.trim().is_empty()) {
        return Err(TaskDagError::Validation(format!(
            "exit criterion #{} has an empty description",
            blank + 1
        )));
    }
    ensure_not_completed(list.require_task(task_id)?)?;

    let now = Utc::now();
    let count = descriptions.len();
    let task = list.require_task_mut(task_id)?;
    task.exit_criteria = descriptions.into_iter().map(ExitCriteria::new).collect();
    task.touch(now);
    let task = task.clone();
    list.touch(now);

    info!(list_id = %list.id, task_id = %task_id, criteria = count, version = list.version, "exit criteria replaced");
    Ok(task)
}

/// Update `is_met` and/or notes of one criterion.
///
/// Un-meeting clears `met_at`. Rejected on completed tasks. An update that
/// changes nothing leaves the list version alone.
pub fn update_exit_criterion(
    list: &mut TaskList,
    task_id: &str,
    criterion_id: &str,
    update: CriterionUpdate,
) -> Result<Task> {
    ensure_not_completed(list.require_task(task_id)?)?;

    let now = Utc::now();
    let task = list.require_task_mut(task_id)?;
    let changed = match update.is_met {
        Some(true) => mark_criterion_met(task, criterion_id, update.notes)?,
        Some(false) => {
            let id = task.id.clone();
            let criterion = find_mut(&mut task.exit_criteria, &id, criterion_id)?;
            let changed = criterion.is_met || (update.notes.is_some() && criterion.notes != update.notes);
            criterion.is_met = false;
            criterion.met_at = None;
            if update.notes.is_some() {
                criterion.notes = update.notes;
            }
            if changed {
                task.touch(now);
            }
            changed
        }
        None => {
            let id = task.id.clone();
            let criterion = find_mut(&mut task.exit_criteria, &id, criterion_id)?;
            let changed = update.notes.is_some() && criterion.notes != update.notes;
            if changed {
                criterion.notes = update.notes;
                task.touch(now);
            }
            changed
        }
    };
    let task = task.clone();
    if !changed {
        debug!(list_id = %list.id, task_id = %task_id, criterion_id = %criterion_id, "exit criterion unchanged");
        return Ok(task);
    }
    list.touch(now);

    debug!(
        list_id = %list.id,
        task_id = %task_id,
        criterion_id = %criterion_id,
        progress = progress(&task),
        "exit criterion updated"
    );
    Ok(task)
}

fn ensure_not_completed(task: &Task) -> Result<()> {
    if task.status() == TaskStatus::Completed {
        return Err(TaskDagError::Validation(format!(
            "exit criteria of completed task '{}' cannot change",
            task.id
        )));
    }
    Ok(())
}

fn find_mut<'a>(
    criteria: &'a mut [ExitCriteria],
    task_id: &str,
    criterion_id: &str,
) -> Result<&'a mut ExitCriteria> {
    criteria
        .iter_mut()
        .find(|c| c.id == criterion_id)
        .ok_or_else(|| TaskDagError::ExitCriterionNotFound {
            task_id: task_id.to_string(),
            criterion_id: criterion_id.to_string(),
        })
}
