// src/model/mod.rs

//! Domain model: task lists, tasks and their exit criteria.
//!
//! - [`list`] holds the `TaskList` aggregate and its plain CRUD.
//! - [`task`] holds `Task`, `ExitCriteria`, `Priority` and input types.

pub mod list;
pub mod task;

/// Opaque task identifier, unique within its list.
pub type TaskId = String;

/// Opaque list identifier.
pub type ListId = String;

pub use list::TaskList;
pub use task::{ExitCriteria, NewTask, Priority, Task, TaskUpdate};
