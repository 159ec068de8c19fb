// src/store/file.rs

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, anyhow};
use tracing::debug;

use super::{ListStore, SaveAction, check_version};
use crate::errors::{Result, TaskDagError};
use crate::model::TaskList;

/// One pretty-printed JSON document per list: `<dir>/<list-id>.json`.
///
/// Saves write to a sibling temp file and rename it into place, so a reader
/// never sees a half-written list.
#[derive(Debug)]
pub struct FileListStore {
    dir: PathBuf,
    // Serialises check-then-write within this process.
    write_lock: Mutex<()>,
}

impl FileListStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| format!("creating store dir {:?}", dir))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    fn path_for(&self, list_id: &str) -> Result<PathBuf> {
        let valid = !list_id.is_empty()
            && list_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(TaskDagError::Validation(format!(
                "list id '{list_id}' is not usable as a file name"
            )));
        }
        Ok(self.dir.join(format!("{list_id}.json")))
    }

    fn read(&self, list_id: &str) -> Result<Option<TaskList>> {
        let path = self.path_for(list_id)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl ListStore for FileListStore {
    fn load(&self, list_id: &str) -> Result<TaskList> {
        self.read(list_id)?
            .ok_or_else(|| TaskDagError::ListNotFound(list_id.to_string()))
    }

    fn save(&self, list: &TaskList) -> Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| TaskDagError::Other(anyhow!("file store lock poisoned")))?;

        let stored = self.read(&list.id)?;
        if check_version(stored.as_ref(), list)? == SaveAction::Skip {
            debug!(list_id = %list.id, version = list.version, "save skipped; content unchanged");
            return Ok(());
        }

        let path = self.path_for(&list.id)?;
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_vec_pretty(list)?;
        {
            let mut file = fs::File::create(&tmp).with_context(|| format!("creating file {:?}", tmp))?;
            file.write_all(&json)
                .with_context(|| format!("writing to file {:?}", tmp))?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path).with_context(|| format!("renaming {:?} to {:?}", tmp, path))?;

        debug!(list_id = %list.id, version = list.version, path = %path.display(), "list saved");
        Ok(())
    }

    fn delete(&self, list_id: &str) -> Result<()> {
        let path = self.path_for(list_id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(TaskDagError::ListNotFound(list_id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn list_ids(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.dir).with_context(|| format!("reading dir {:?}", self.dir))? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}
