//! JSON-backed project/task store.
//!
//! The whole graph is held in memory and written back as one document after
//! every mutation. [`SharedStore`] is the process-wide handle; every
//! find-mutate-save sequence runs inside a single `write` closure.

pub mod process;
mod seed;
pub mod tasks;

use crate::types::{Project, Task};
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub use seed::seed_document;

/// Errors from reading or writing the store document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{path} is not writable")]
    ReadOnly { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize store: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Serialized form of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub next_task_id: i64,
}

impl StoreDocument {
    /// Highest task id in the document, if any task exists.
    pub fn max_task_id(&self) -> Option<i64> {
        self.projects
            .iter()
            .flat_map(|p| p.tasks.iter())
            .map(|t| t.id)
            .max()
    }

    /// Make sure the counter cannot hand out an id already in use.
    fn repair_counter(&mut self) {
        let floor = self.max_task_id().map_or(1, |max| max + 1);
        if self.next_task_id < floor {
            warn!(
                next_task_id = self.next_task_id,
                floor, "Task id counter behind existing ids; bumping"
            );
            self.next_task_id = floor;
        }
    }
}

/// In-memory store bound to its JSON file.
#[derive(Debug, Clone)]
pub struct TaskStore {
    path: PathBuf,
    doc: StoreDocument,
}

impl TaskStore {
    /// Load the store from `path`, falling back to the seed dataset when the
    /// file is absent, unreadable or malformed. Never fails.
    ///
    /// A malformed file is moved aside to `<name>.corrupt` first, so the next
    /// save cannot overwrite the only copy of the user's data.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = match read_document(&path) {
            Ok(Some(mut doc)) => {
                doc.repair_counter();
                info!(
                    path = %path.display(),
                    projects = doc.projects.len(),
                    "Loaded task store"
                );
                doc
            }
            Ok(None) => {
                info!(path = %path.display(), "No task store on disk; using seed data");
                seed_document()
            }
            Err(e @ StoreError::Parse { .. }) => {
                let backup = sibling_path(&path, ".corrupt");
                match std::fs::rename(&path, &backup) {
                    Ok(()) => warn!(
                        error = %e,
                        backup = %backup.display(),
                        "Task store malformed; moved aside, using seed data"
                    ),
                    Err(rename_err) => warn!(
                        error = %e,
                        rename_error = %rename_err,
                        "Task store malformed and could not be moved aside; using seed data"
                    ),
                }
                seed_document()
            }
            Err(e) => {
                warn!(error = %e, "Task store unusable; using seed data");
                seed_document()
            }
        };
        Self { path, doc }
    }

    /// Build a store from an explicit document (no disk access).
    pub fn from_document(path: impl Into<PathBuf>, mut doc: StoreDocument) -> Self {
        doc.repair_counter();
        Self {
            path: path.into(),
            doc,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &StoreDocument {
        &self.doc
    }

    pub fn projects(&self) -> &[Project] {
        &self.doc.projects
    }

    pub fn projects_mut(&mut self) -> &mut [Project] {
        &mut self.doc.projects
    }

    /// Persist the store, reporting success as a flag. Failures are logged.
    pub fn save(&self) -> bool {
        match self.try_save() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Failed to save task store");
                false
            }
        }
    }

    /// Persist the store.
    ///
    /// Writes a sibling `.tmp` file and renames it over the target, so a crash
    /// mid-write leaves the previous document intact.
    pub fn try_save(&self) -> Result<(), StoreError> {
        let path = &self.path;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if let Ok(meta) = std::fs::metadata(path)
            && meta.permissions().readonly()
        {
            return Err(StoreError::ReadOnly { path: path.clone() });
        }

        let json = serde_json::to_string_pretty(&self.doc)?;
        let tmp = temp_path(path);
        std::fs::write(&tmp, json).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| StoreError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), "Saved task store");
        Ok(())
    }

    pub fn find_project(&self, project_id: i64) -> Option<&Project> {
        self.doc.projects.iter().find(|p| p.id == project_id)
    }

    pub fn find_project_mut(&mut self, project_id: i64) -> Option<&mut Project> {
        self.doc.projects.iter_mut().find(|p| p.id == project_id)
    }

    pub fn find_task(&self, project_id: i64, task_id: i64) -> Option<&Task> {
        self.find_project(project_id)?
            .tasks
            .iter()
            .find(|t| t.id == task_id)
    }

    pub fn find_task_mut(&mut self, project_id: i64, task_id: i64) -> Option<&mut Task> {
        self.find_project_mut(project_id)?
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
    }

    /// Hand out the next task id and advance the counter.
    pub fn next_task_id(&mut self) -> i64 {
        let id = self.doc.next_task_id;
        self.doc.next_task_id += 1;
        id
    }
}

fn temp_path(path: &Path) -> PathBuf {
    sibling_path(path, ".tmp")
}

/// `data.json` → `data.json<suffix>` in the same directory.
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Read and parse the document; `Ok(None)` when the file does not exist.
pub fn read_document(path: &Path) -> Result<Option<StoreDocument>, StoreError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    let doc = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(doc))
}

/// Process-wide handle to the store.
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<TaskStore>>,
}

impl SharedStore {
    pub fn new(store: TaskStore) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Run `f` with shared access to the store.
    pub fn read<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&TaskStore) -> Result<T, E>,
        E: From<anyhow::Error>,
    {
        let store = self
            .inner
            .lock()
            .map_err(|_| anyhow!("task store lock poisoned"))?;
        f(&store)
    }

    /// Run `f` with exclusive access to the store.
    pub fn write<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut TaskStore) -> Result<T, E>,
        E: From<anyhow::Error>,
    {
        let mut store = self
            .inner
            .lock()
            .map_err(|_| anyhow!("task store lock poisoned"))?;
        f(&mut store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_falls_back_to_seed() {
        let temp = TempDir::new().unwrap();
        let store = TaskStore::load(temp.path().join("data.json"));
        assert_eq!(store.document(), &seed_document());
    }

    #[test]
    fn corrupt_file_falls_back_to_seed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("data.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = TaskStore::load(&path);
        assert_eq!(store.document(), &seed_document());
        assert!(!path.exists());
        let backup = sibling_path(&path, ".corrupt");
        assert_eq!(std::fs::read_to_string(backup).unwrap(), "{ not json");
    }

    #[test]
    fn save_creates_parent_dirs_and_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("dir").join("data.json");
        let store = TaskStore::from_document(&path, seed_document());

        assert!(store.save());
        assert!(path.exists());
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn counter_is_bumped_past_existing_ids() {
        let mut doc = seed_document();
        doc.next_task_id = 0;
        let max = doc.max_task_id().unwrap();

        let mut store = TaskStore::from_document("unused.json", doc);
        assert_eq!(store.next_task_id(), max + 1);
        assert_eq!(store.next_task_id(), max + 2);
    }

    #[test]
    fn shared_store_write_is_visible_to_read() {
        let shared = SharedStore::new(TaskStore::from_document("unused.json", seed_document()));
        let id: i64 = shared
            .write(|s| Ok::<_, anyhow::Error>(s.next_task_id()))
            .unwrap();
        let next: i64 = shared
            .read(|s| Ok::<_, anyhow::Error>(s.document().next_task_id))
            .unwrap();
        assert_eq!(next, id + 1);
    }
}
