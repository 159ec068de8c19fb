// src/service.rs

//! Caller-facing entry point over a [`ListStore`].
//!
//! Every mutation runs load → validate → mutate → save while holding a
//! per-list async lock, so two callers in the same process never interleave
//! on one list. The store's version check catches writers in other
//! processes. Reads take no lock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use anyhow::anyhow;
use serde::Serialize;
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::dag::{self, BlockedTask, DependencyAnalysis, DependencyRules, DependencyUpdate};
use crate::errors::{Result, TaskDagError};
use crate::lifecycle::{self, CriterionUpdate};
use crate::model::{ListId, NewTask, Task, TaskId, TaskList, TaskUpdate};
use crate::store::{FileListStore, ListStore, MemoryListStore};
use crate::types::{StorageMode, TaskStatus, VisualizationFormat};

/// A committed change, published after the list has been saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ListEvent {
    ListCreated {
        list_id: ListId,
    },
    ListDeleted {
        list_id: ListId,
    },
    TaskAdded {
        list_id: ListId,
        task_id: TaskId,
        version: u64,
    },
    TaskUpdated {
        list_id: ListId,
        task_id: TaskId,
        version: u64,
    },
    TaskRemoved {
        list_id: ListId,
        task_id: TaskId,
        version: u64,
    },
    DependenciesChanged {
        list_id: ListId,
        task_id: TaskId,
        dependencies: Vec<TaskId>,
        version: u64,
    },
    StatusChanged {
        list_id: ListId,
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        version: u64,
    },
    ExitCriteriaChanged {
        list_id: ListId,
        task_id: TaskId,
        version: u64,
    },
}

#[derive(Debug)]
pub struct TaskListService {
    store: Arc<dyn ListStore>,
    // Entries die with their last guard holder and are pruned on the next lookup.
    locks: Mutex<HashMap<ListId, Weak<AsyncMutex<()>>>>,
    rules: DependencyRules,
    config: ConfigFile,
    events: Option<mpsc::Sender<ListEvent>>,
}

impl TaskListService {
    pub fn new(store: Arc<dyn ListStore>, config: &ConfigFile) -> Self {
        Self {
            store,
            locks: Mutex::new(HashMap::new()),
            rules: config.dependency_rules(),
            config: config.clone(),
            events: None,
        }
    }

    /// Build the service with the store selected by `[storage]`.
    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        let store: Arc<dyn ListStore> = match config.storage.mode {
            StorageMode::Memory => Arc::new(MemoryListStore::new()),
            StorageMode::File => Arc::new(FileListStore::open(&config.storage.dir)?),
        };
        debug!(mode = ?config.storage.mode, "task list store ready");
        Ok(Self::new(store, config))
    }

    /// Publish committed changes on `tx`.
    pub fn with_events(mut self, tx: mpsc::Sender<ListEvent>) -> Self {
        self.events = Some(tx);
        self
    }

    // ----- lists ---------------------------------------------------------

    pub async fn create_list(&self, list: TaskList) -> Result<TaskList> {
        if list.title.trim().is_empty() {
            return Err(TaskDagError::Validation("list title must not be empty".into()));
        }
        list.validate_invariants(self.rules.max_dependencies)?;

        {
            let lock = self.lock_for(&list.id)?;
            let _guard = lock.lock().await;
            match self.store.load(&list.id) {
                Ok(_) => {
                    return Err(TaskDagError::Validation(format!(
                        "list '{}' already exists",
                        list.id
                    )));
                }
                Err(TaskDagError::ListNotFound(_)) => {}
                Err(e) => return Err(e),
            }
            self.store.save(&list)?;
        }

        info!(list_id = %list.id, title = %list.title, "list created");
        self.publish(ListEvent::ListCreated {
            list_id: list.id.clone(),
        })
        .await;
        Ok(list)
    }

    pub async fn get_list(&self, list_id: &str) -> Result<TaskList> {
        self.load_checked(list_id)
    }

    pub async fn delete_list(&self, list_id: &str) -> Result<()> {
        {
            let lock = self.lock_for(list_id)?;
            let _guard = lock.lock().await;
            self.store.delete(list_id)?;
        }

        info!(list_id = %list_id, "list deleted");
        self.publish(ListEvent::ListDeleted {
            list_id: list_id.to_string(),
        })
        .await;
        Ok(())
    }

    pub fn list_ids(&self) -> Result<Vec<ListId>> {
        self.store.list_ids()
    }

    // ----- tasks ---------------------------------------------------------

    pub async fn add_task(&self, list_id: &str, new: NewTask) -> Result<Task> {
        let (task, version) = self
            .mutate(list_id, |list| list.add_task(new).cloned())
            .await?;
        self.publish(ListEvent::TaskAdded {
            list_id: list_id.to_string(),
            task_id: task.id.clone(),
            version,
        })
        .await;
        Ok(task)
    }

    pub async fn update_task(&self, list_id: &str, task_id: &str, update: TaskUpdate) -> Result<Task> {
        let (task, version) = self
            .mutate(list_id, |list| list.update_task(task_id, update).cloned())
            .await?;
        self.publish(ListEvent::TaskUpdated {
            list_id: list_id.to_string(),
            task_id: task.id.clone(),
            version,
        })
        .await;
        Ok(task)
    }

    /// Remove a task; other tasks drop it from their dependencies.
    pub async fn remove_task(&self, list_id: &str, task_id: &str) -> Result<Task> {
        let (task, version) = self.mutate(list_id, |list| list.remove_task(task_id)).await?;
        self.publish(ListEvent::TaskRemoved {
            list_id: list_id.to_string(),
            task_id: task.id.clone(),
            version,
        })
        .await;
        Ok(task)
    }

    // ----- dependencies --------------------------------------------------

    pub async fn set_dependencies(
        &self,
        list_id: &str,
        task_id: &str,
        dependencies: Vec<TaskId>,
    ) -> Result<DependencyUpdate> {
        let rules = self.rules;
        let (update, version) = self
            .mutate(list_id, |list| {
                dag::set_dependencies(list, task_id, dependencies, &rules)
            })
            .await?;
        self.publish_dependencies(list_id, &update.task, version).await;
        Ok(update)
    }

    pub async fn add_dependency(&self, list_id: &str, task_id: &str, dependency_id: &str) -> Result<DependencyUpdate> {
        let rules = self.rules;
        let (update, version) = self
            .mutate(list_id, |list| {
                dag::add_dependency(list, task_id, dependency_id, &rules)
            })
            .await?;
        self.publish_dependencies(list_id, &update.task, version).await;
        Ok(update)
    }

    pub async fn remove_dependency(&self, list_id: &str, task_id: &str, dependency_id: &str) -> Result<DependencyUpdate> {
        let rules = self.rules;
        let (update, version) = self
            .mutate(list_id, |list| {
                dag::remove_dependency(list, task_id, dependency_id, &rules)
            })
            .await?;
        self.publish_dependencies(list_id, &update.task, version).await;
        Ok(update)
    }

    // ----- queries -------------------------------------------------------

    pub async fn get_ready_tasks(&self, list_id: &str, limit: Option<usize>) -> Result<Vec<Task>> {
        let list = self.load_checked(list_id)?;
        Ok(dag::get_ready_tasks(&list, limit))
    }

    pub async fn get_blocked_tasks(&self, list_id: &str) -> Result<Vec<BlockedTask>> {
        let list = self.load_checked(list_id)?;
        Ok(dag::get_blocked_tasks(&list))
    }

    /// Analyse a list; `format` falls back to `[engine].default_format`.
    pub async fn analyze_dependencies(
        &self,
        list_id: &str,
        format: Option<VisualizationFormat>,
    ) -> Result<DependencyAnalysis> {
        let list = self.load_checked(list_id)?;
        dag::analyze_dependencies(&list, &self.config.analysis_options(format))
    }

    // ----- lifecycle -----------------------------------------------------

    pub async fn set_task_status(&self, list_id: &str, task_id: &str, status: TaskStatus) -> Result<Task> {
        let ((from, task), version) = self
            .mutate(list_id, |list| {
                let from = list.require_task(task_id)?.status();
                let task = lifecycle::set_task_status(list, task_id, status)?;
                Ok((from, task))
            })
            .await?;
        self.publish(ListEvent::StatusChanged {
            list_id: list_id.to_string(),
            task_id: task.id.clone(),
            from,
            to: status,
            version,
        })
        .await;
        Ok(task)
    }

    pub async fn set_exit_criteria(&self, list_id: &str, task_id: &str, descriptions: Vec<String>) -> Result<Task> {
        let (task, version) = self
            .mutate(list_id, |list| {
                lifecycle::set_exit_criteria(list, task_id, descriptions)
            })
            .await?;
        self.publish_criteria(list_id, &task, version).await;
        Ok(task)
    }

    pub async fn update_exit_criterion(
        &self,
        list_id: &str,
        task_id: &str,
        criterion_id: &str,
        update: CriterionUpdate,
    ) -> Result<Task> {
        let ((task, changed), version) = self
            .mutate(list_id, |list| {
                let before = list.version;
                let task = lifecycle::update_exit_criterion(list, task_id, criterion_id, update)?;
                Ok((task, list.version != before))
            })
            .await?;
        if changed {
            self.publish_criteria(list_id, &task, version).await;
        }
        Ok(task)
    }

    // ----- internals -----------------------------------------------------

    fn lock_for(&self, list_id: &str) -> Result<Arc<AsyncMutex<()>>> {
        let mut locks = self
            .locks
            .lock()
            .map_err(|_| TaskDagError::Other(anyhow!("service lock table poisoned")))?;
        locks.retain(|_, lock| lock.strong_count() > 0);
        if let Some(lock) = locks.get(list_id).and_then(Weak::upgrade) {
            return Ok(lock);
        }
        let lock = Arc::new(AsyncMutex::new(()));
        locks.insert(list_id.to_string(), Arc::downgrade(&lock));
        Ok(lock)
    }

    fn load_checked(&self, list_id: &str) -> Result<TaskList> {
        let list = self.store.load(list_id)?;
        // Lists written under a looser configured limit stay readable.
        if let Err(e) = list.validate_invariants(dag::MAX_DEPENDENCIES) {
            warn!(list_id = %list_id, "stored list failed validation: {e}");
            return Err(e);
        }
        Ok(list)
    }

    /// Run `f` against a fresh copy of the list and save the result.
    ///
    /// Returns `f`'s output and the saved version. If `f` fails nothing is
    /// written.
    async fn mutate<T, F>(&self, list_id: &str, f: F) -> Result<(T, u64)>
    where
        F: FnOnce(&mut TaskList) -> Result<T>,
    {
        let lock = self.lock_for(list_id)?;
        let _guard = lock.lock().await;

        let mut list = self.load_checked(list_id)?;
        let out = f(&mut list)?;
        self.store.save(&list)?;
        Ok((out, list.version))
    }

    async fn publish_dependencies(&self, list_id: &str, task: &Task, version: u64) {
        self.publish(ListEvent::DependenciesChanged {
            list_id: list_id.to_string(),
            task_id: task.id.clone(),
            dependencies: task.dependencies().to_vec(),
            version,
        })
        .await;
    }

    async fn publish_criteria(&self, list_id: &str, task: &Task, version: u64) {
        self.publish(ListEvent::ExitCriteriaChanged {
            list_id: list_id.to_string(),
            task_id: task.id.clone(),
            version,
        })
        .await;
    }

    async fn publish(&self, event: ListEvent) {
        if let Some(tx) = &self.events {
            if tx.send(event).await.is_err() {
                debug!("list event receiver dropped");
            }
        }
    }
}
