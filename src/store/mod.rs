// src/store/mod.rs

//! Persistence for task lists.
//!
//! A store holds whole [`TaskList`] documents keyed by list id. Writes are
//! checked against the stored `version`:
//!
//! - a lower version than the stored one is a [`TaskDagError::VersionConflict`];
//! - the same version with different content is also a conflict (two
//!   writers both bumped from the same base);
//! - the same version with identical content is a no-op.

use std::fmt::Debug;

use crate::errors::{Result, TaskDagError};
use crate::model::TaskList;

pub mod file;
pub mod memory;

pub use file::FileListStore;
pub use memory::MemoryListStore;

/// Abstract list storage.
pub trait ListStore: Send + Sync + Debug {
    /// Load a list, or `ListNotFound`.
    fn load(&self, list_id: &str) -> Result<TaskList>;

    /// Persist a list, enforcing the version rules above.
    fn save(&self, list: &TaskList) -> Result<()>;

    /// Remove a list. Missing lists are `ListNotFound`.
    fn delete(&self, list_id: &str) -> Result<()>;

    /// Ids of every stored list, sorted.
    fn list_ids(&self) -> Result<Vec<String>>;
}

/// What a save should do given the currently stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveAction {
    Write,
    Skip,
}

pub(crate) fn check_version(stored: Option<&TaskList>, incoming: &TaskList) -> Result<SaveAction> {
    let Some(stored) = stored else {
        return Ok(SaveAction::Write);
    };

    let conflict = || TaskDagError::VersionConflict {
        list_id: incoming.id.clone(),
        attempted: incoming.version,
        stored: stored.version,
    };

    if incoming.version < stored.version {
        return Err(conflict());
    }
    if incoming.version == stored.version {
        return if stored == incoming {
            Ok(SaveAction::Skip)
        } else {
            Err(conflict())
        };
    }
    Ok(SaveAction::Write)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;

    #[test]
    fn first_save_always_writes() {
        let list = TaskList::with_id("l", "x");
        assert_eq!(check_version(None, &list).unwrap(), SaveAction::Write);
    }

    #[test]
    fn version_rules() {
        let base = TaskList::with_id("l", "x");

        let mut newer = base.clone();
        newer.add_task(NewTask::new("a")).unwrap();
        assert_eq!(check_version(Some(&base), &newer).unwrap(), SaveAction::Write);
        assert_eq!(check_version(Some(&newer), &newer).unwrap(), SaveAction::Skip);

        let err = check_version(Some(&newer), &base).unwrap_err();
        assert!(matches!(err, TaskDagError::VersionConflict { attempted: 0, stored: 1, .. }));

        let mut rival = base.clone();
        rival.add_task(NewTask::new("b")).unwrap();
        let err = check_version(Some(&newer), &rival).unwrap_err();
        assert!(err.is_retryable());
    }
}
