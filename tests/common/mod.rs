#![allow(dead_code)]

use taskdag::model::{Task, TaskList};

pub use taskdag_test_utils::init_tracing;

/// Ids of `tasks`, in order.
pub fn ids(tasks: &[Task]) -> Vec<&str> {
    tasks.iter().map(|t| t.id.as_str()).collect()
}

/// Dependencies of `task_id` as plain strings.
pub fn deps_of<'a>(list: &'a TaskList, task_id: &str) -> Vec<&'a str> {
    list.task(task_id)
        .expect("task exists")
        .dependencies()
        .iter()
        .map(String::as_str)
        .collect()
}
