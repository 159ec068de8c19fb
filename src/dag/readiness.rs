// src/dag/readiness.rs

//! Ready/blocked classification of non-terminal tasks.
//!
//! A non-terminal task is ready when every dependency is `completed`
//! (vacuously true with no dependencies), otherwise it is blocked. The two
//! sets partition the non-terminal tasks of a list.

use serde::Serialize;
use tracing::debug;

use crate::model::{Task, TaskId, TaskList};
use crate::types::TaskStatus;

/// A blocked task together with the dependencies holding it back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockedTask {
    pub task: Task,
    /// Dependency ids whose target is not completed, in dependency order.
    pub blocked_by: Vec<TaskId>,
}

/// Dependencies of `task` that are not completed yet.
///
/// An id that does not resolve counts as incomplete.
pub fn incomplete_dependencies(list: &TaskList, task: &Task) -> Vec<TaskId> {
    task.dependencies()
        .iter()
        .filter(|dep| {
            list.task(dep)
                .is_none_or(|t| t.status() != TaskStatus::Completed)
        })
        .cloned()
        .collect()
}

pub fn is_ready(list: &TaskList, task: &Task) -> bool {
    !task.is_terminal()
        && task.dependencies().iter().all(|dep| {
            list.task(dep)
                .is_some_and(|t| t.status() == TaskStatus::Completed)
        })
}

/// Ready tasks, highest priority first, then oldest first.
///
/// Ties after `created_at` keep list order. `limit` truncates after sorting.
pub fn get_ready_tasks(list: &TaskList, limit: Option<usize>) -> Vec<Task> {
    let mut ready: Vec<&Task> = list.tasks().iter().filter(|t| is_ready(list, t)).collect();

    // Stable sort keeps list order for full ties.
    ready.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });

    if let Some(n) = limit {
        ready.truncate(n);
    }

    debug!(list_id = %list.id, ready = ready.len(), ?limit, "computed ready tasks");
    ready.into_iter().cloned().collect()
}

/// Non-terminal tasks with at least one incomplete dependency, in list order.
pub fn get_blocked_tasks(list: &TaskList) -> Vec<BlockedTask> {
    let blocked: Vec<BlockedTask> = list
        .tasks()
        .iter()
        .filter(|t| !t.is_terminal())
        .filter_map(|t| {
            let blocked_by = incomplete_dependencies(list, t);
            if blocked_by.is_empty() {
                None
            } else {
                Some(BlockedTask {
                    task: t.clone(),
                    blocked_by,
                })
            }
        })
        .collect();

    debug!(list_id = %list.id, blocked = blocked.len(), "computed blocked tasks");
    blocked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewTask, Priority};

    fn list() -> TaskList {
        let mut list = TaskList::with_id("l", "ready");
        list.add_task(NewTask::new("a").with_id("A")).unwrap();
        list.add_task(NewTask::new("b").with_id("B")).unwrap();
        list.add_task(NewTask::new("c").with_id("C")).unwrap();
        list.task_mut("B").unwrap().dependencies = vec!["A".into()];
        list.task_mut("C").unwrap().dependencies = vec!["A".into(), "B".into()];
        list
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn roots_are_ready_dependents_blocked() {
        let list = list();
        assert_eq!(ids(&get_ready_tasks(&list, None)), vec!["A"]);

        let blocked = get_blocked_tasks(&list);
        assert_eq!(blocked.len(), 2);
        assert_eq!(blocked[0].task.id, "B");
        assert_eq!(blocked[0].blocked_by, vec!["A".to_string()]);
        assert_eq!(blocked[1].blocked_by, vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn blocked_by_shrinks_as_dependencies_complete() {
        let mut list = list();
        list.task_mut("A").unwrap().status = TaskStatus::Completed;

        assert_eq!(ids(&get_ready_tasks(&list, None)), vec!["B"]);
        let blocked = get_blocked_tasks(&list);
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].blocked_by, vec!["B".to_string()]);
    }

    #[test]
    fn terminal_tasks_are_neither_ready_nor_blocked() {
        let mut list = list();
        list.task_mut("C").unwrap().status = TaskStatus::Cancelled;
        list.task_mut("A").unwrap().status = TaskStatus::Completed;

        assert_eq!(ids(&get_ready_tasks(&list, None)), vec!["B"]);
        assert!(get_blocked_tasks(&list).is_empty());
    }

    #[test]
    fn cancelled_dependency_keeps_dependent_blocked() {
        let mut list = list();
        list.task_mut("A").unwrap().status = TaskStatus::Cancelled;
        let blocked = get_blocked_tasks(&list);
        assert_eq!(blocked[0].task.id, "B");
        assert!(get_ready_tasks(&list, None).is_empty());
    }

    #[test]
    fn ordered_by_priority_then_age_and_limited() {
        let mut list = TaskList::with_id("l", "prio");
        for (id, p) in [("low", 1), ("high", 5), ("mid", 3), ("high2", 5)] {
            list.add_task(
                NewTask::new(id)
                    .with_id(id)
                    .with_priority(Priority::new(p).unwrap()),
            )
            .unwrap();
        }
        // Force a strict created_at ordering between the two priority-5 tasks.
        let base = list.task("high").unwrap().created_at;
        list.task_mut("high2").unwrap().created_at = base - chrono::Duration::seconds(10);

        assert_eq!(
            ids(&get_ready_tasks(&list, None)),
            vec!["high2", "high", "mid", "low"]
        );
        assert_eq!(ids(&get_ready_tasks(&list, Some(2))), vec!["high2", "high"]);
        assert!(get_ready_tasks(&list, Some(0)).is_empty());
    }

    #[test]
    fn in_progress_and_blocked_statuses_can_be_ready() {
        let mut list = list();
        list.task_mut("A").unwrap().status = TaskStatus::InProgress;
        assert_eq!(ids(&get_ready_tasks(&list, None)), vec!["A"]);
        list.task_mut("A").unwrap().status = TaskStatus::Blocked;
        assert_eq!(ids(&get_ready_tasks(&list, None)), vec!["A"]);
    }
}
