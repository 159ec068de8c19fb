// src/store/memory.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;

use super::{ListStore, SaveAction, check_version};
use crate::errors::{Result, TaskDagError};
use crate::model::TaskList;

/// In-process store. Clones share the same backing map.
#[derive(Debug, Clone, Default)]
pub struct MemoryListStore {
    lists: Arc<Mutex<HashMap<String, TaskList>>>,
}

impl MemoryListStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<String, TaskList>>> {
        self.lists
            .lock()
            .map_err(|_| TaskDagError::Other(anyhow!("memory store lock poisoned")))
    }
}

impl ListStore for MemoryListStore {
    fn load(&self, list_id: &str) -> Result<TaskList> {
        self.lock()?
            .get(list_id)
            .cloned()
            .ok_or_else(|| TaskDagError::ListNotFound(list_id.to_string()))
    }

    fn save(&self, list: &TaskList) -> Result<()> {
        let mut lists = self.lock()?;
        if check_version(lists.get(&list.id), list)? == SaveAction::Write {
            lists.insert(list.id.clone(), list.clone());
        }
        Ok(())
    }

    fn delete(&self, list_id: &str) -> Result<()> {
        self.lock()?
            .remove(list_id)
            .map(|_| ())
            .ok_or_else(|| TaskDagError::ListNotFound(list_id.to_string()))
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids: Vec<String> = self.lock()?.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewTask;

    #[test]
    fn save_load_delete() {
        let store = MemoryListStore::new();
        let mut list = TaskList::with_id("l1", "one");
        list.add_task(NewTask::new("a").with_id("A")).unwrap();
        store.save(&list).unwrap();

        let loaded = store.load("l1").unwrap();
        assert_eq!(loaded, list);
        assert_eq!(store.list_ids().unwrap(), vec!["l1".to_string()]);

        store.delete("l1").unwrap();
        assert!(matches!(store.load("l1"), Err(TaskDagError::ListNotFound(_))));
        assert!(matches!(store.delete("l1"), Err(TaskDagError::ListNotFound(_))));
    }

    #[test]
    fn stale_write_is_rejected_and_store_unchanged() {
        let store = MemoryListStore::new();
        let base = TaskList::with_id("l", "x");
        store.save(&base).unwrap();

        let mut first = base.clone();
        first.add_task(NewTask::new("first")).unwrap();
        let mut second = base.clone();
        second.add_task(NewTask::new("second")).unwrap();

        store.save(&first).unwrap();
        assert!(matches!(
            store.save(&second),
            Err(TaskDagError::VersionConflict { .. })
        ));
        assert_eq!(store.load("l").unwrap(), first);
    }

    #[test]
    fn clones_share_state() {
        let store = MemoryListStore::new();
        let other = store.clone();
        store.save(&TaskList::with_id("shared", "s")).unwrap();
        assert!(other.load("shared").is_ok());
    }
}
