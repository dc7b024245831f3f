//! Storage layer for lina
//!
//! The whole task collection lives in one JSON array:
//!
//! ```text
//! <storage_dir>/
//!   tasks.json      # pretty-printed array of task records
//! ```
//!
//! Every mutation rewrites the file through a temp sibling and a rename, so
//! readers see either the previous or the new collection. There is no
//! locking; across processes the last writer wins.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::Task;

/// Problem found while reading the collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadIssue {
    /// The file exists but could not be read; no tasks are returned
    Unreadable(String),
    /// The file was read but is not a valid task array; no tasks are returned
    Corrupt(String),
    /// Every task was read, but this id appears more than once
    DuplicateId(String),
}

impl LoadIssue {
    pub fn message(&self) -> String {
        match self {
            LoadIssue::Unreadable(err) => format!("task file could not be read: {err}"),
            LoadIssue::Corrupt(err) => format!("task file is corrupt, showing no tasks: {err}"),
            LoadIssue::DuplicateId(id) => format!(
                "task file contains id {id} more than once; changes are refused until it is fixed"
            ),
        }
    }

    /// Error returned by operations that would rewrite the file.
    pub fn into_error(self) -> Error {
        match self {
            LoadIssue::Unreadable(err) | LoadIssue::Corrupt(err) => Error::CorruptStorage(err),
            LoadIssue::DuplicateId(id) => Error::DuplicateTaskId(id),
        }
    }
}

/// Result of reading the collection, with any degradation reported
#[derive(Debug, Clone, Default)]
pub struct Loaded {
    pub tasks: Vec<Task>,
    pub issue: Option<LoadIssue>,
}

/// Storage manager for the task collection
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
    file: PathBuf,
}

impl Storage {
    /// Storage rooted at `tasks_file`; its parent directory is created on demand.
    pub fn new(tasks_file: PathBuf) -> Self {
        let dir = tasks_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            dir,
            file: tasks_file,
        }
    }

    pub fn tasks_file(&self) -> &Path {
        &self.file
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the storage directory and an empty `[]` collection if missing.
    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        if !self.file.exists() {
            debug!(path = %self.file.display(), "initializing empty task file");
            self.write_atomic(&self.file, b"[]")?;
        }
        Ok(())
    }

    /// Read every task. Unreadable or corrupt content yields an empty list.
    pub fn read_all(&self) -> Result<Vec<Task>> {
        Ok(self.load()?.tasks)
    }

    /// Read every task ahead of a rewrite. Any load issue is an error, so a
    /// damaged file is never replaced by a partial collection.
    pub fn read_for_update(&self) -> Result<Vec<Task>> {
        let loaded = self.load()?;
        match loaded.issue {
            Some(issue) => Err(issue.into_error()),
            None => Ok(loaded.tasks),
        }
    }

    /// Read every task and report why the read degraded, if it did.
    pub fn load(&self) -> Result<Loaded> {
        self.ensure()?;

        let content = match fs::read_to_string(&self.file) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %self.file.display(), error = %err, "unable to read tasks");
                return Ok(Loaded {
                    tasks: Vec::new(),
                    issue: Some(LoadIssue::Unreadable(err.to_string())),
                });
            }
        };

        match serde_json::from_str::<Vec<Task>>(&content) {
            Ok(tasks) => {
                debug!(path = %self.file.display(), count = tasks.len(), "tasks loaded");
                let issue = match validate_unique_ids(&tasks) {
                    Err(Error::DuplicateTaskId(id)) => {
                        warn!(path = %self.file.display(), id = %id, "duplicate task id");
                        Some(LoadIssue::DuplicateId(id))
                    }
                    _ => None,
                };
                Ok(Loaded { tasks, issue })
            }
            Err(err) => {
                warn!(path = %self.file.display(), error = %err, "unable to parse tasks");
                Ok(Loaded {
                    tasks: Vec::new(),
                    issue: Some(LoadIssue::Corrupt(err.to_string())),
                })
            }
        }
    }

    /// Replace the whole collection.
    pub fn write_all(&self, tasks: &[Task]) -> Result<()> {
        validate_unique_ids(tasks)?;
        let json = serde_json::to_string_pretty(tasks)?;
        self.write_atomic(&self.file, json.as_bytes())?;
        debug!(path = %self.file.display(), count = tasks.len(), "tasks written");
        Ok(())
    }

    /// Write data atomically using temp file + rename
    fn write_atomic(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = path.with_extension("json.tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;

        fs::rename(&temp_path, path)?;
        Ok(())
    }
}

fn validate_unique_ids(tasks: &[Task]) -> Result<()> {
    let mut seen = HashSet::new();
    for task in tasks {
        if !seen.insert(task.id.as_str()) {
            return Err(Error::DuplicateTaskId(task.id.clone()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use tempfile::TempDir;

    fn storage(temp: &TempDir) -> Storage {
        Storage::new(temp.path().join("nested/dir/tasks.json"))
    }

    #[test]
    fn read_all_provisions_empty_file() {
        let temp = TempDir::new().expect("tempdir");
        let storage = storage(&temp);

        let tasks = storage.read_all().expect("read");

        assert!(tasks.is_empty());
        let content = fs::read_to_string(storage.tasks_file()).expect("file exists");
        assert_eq!(content, "[]");
    }

    #[test]
    fn write_then_read_preserves_order() {
        let temp = TempDir::new().expect("tempdir");
        let storage = storage(&temp);
        let tasks = vec![
            Task::new("first", Category::General),
            Task::new("second", Category::Project("acme".to_string())),
            Task::new("third", Category::Office),
        ];

        storage.write_all(&tasks).expect("write");
        let read_back = storage.read_all().expect("read");

        assert_eq!(read_back, tasks);
    }

    #[test]
    fn rewriting_unchanged_collection_is_byte_identical() {
        let temp = TempDir::new().expect("tempdir");
        let storage = storage(&temp);
        storage
            .write_all(&[
                Task::new("a", Category::General),
                Task::new("b", Category::Office),
            ])
            .expect("write");
        let before = fs::read(storage.tasks_file()).expect("read bytes");

        let tasks = storage.read_all().expect("read");
        storage.write_all(&tasks).expect("rewrite");

        let after = fs::read(storage.tasks_file()).expect("read bytes");
        assert_eq!(before, after);
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let temp = TempDir::new().expect("tempdir");
        let storage = storage(&temp);
        storage.ensure().expect("ensure");
        fs::write(storage.tasks_file(), "{\"not\": \"an array\"").expect("write");

        assert!(storage.read_all().expect("read").is_empty());
        let loaded = storage.load().expect("load");
        assert!(loaded.tasks.is_empty());
        assert!(matches!(loaded.issue, Some(LoadIssue::Corrupt(_))));
    }

    #[test]
    fn update_read_refuses_corrupt_file() {
        let temp = TempDir::new().expect("tempdir");
        let storage = storage(&temp);
        storage.ensure().expect("ensure");
        fs::write(storage.tasks_file(), "[{\"id\": \"a\"},]").expect("write");

        let err = storage.read_for_update().unwrap_err();
        assert!(matches!(err, Error::CorruptStorage(_)));
        assert_eq!(err.exit_code(), crate::error::exit_codes::OPERATION_FAILED);
    }

    #[test]
    fn duplicate_ids_on_disk_are_reported_at_load() {
        let temp = TempDir::new().expect("tempdir");
        let storage = storage(&temp);
        let task = Task::new("dup", Category::General);
        let record = serde_json::to_value(&task).expect("serialize");
        storage.ensure().expect("ensure");
        fs::write(
            storage.tasks_file(),
            serde_json::to_string(&vec![record.clone(), record]).expect("encode"),
        )
        .expect("write");

        let loaded = storage.load().expect("load");
        assert_eq!(loaded.tasks.len(), 2);
        assert_eq!(loaded.issue, Some(LoadIssue::DuplicateId(task.id.clone())));
        assert!(matches!(
            storage.read_for_update(),
            Err(Error::DuplicateTaskId(ref id)) if *id == task.id
        ));
    }

    #[test]
    fn nameless_project_record_keeps_whole_collection() {
        let temp = TempDir::new().expect("tempdir");
        let storage = storage(&temp);
        storage.ensure().expect("ensure");
        let content = r#"[
  {
    "id": "a",
    "title": "Buy milk",
    "status": "pending",
    "category": "general",
    "project": null,
    "createdAt": "2024-05-01T10:00:00.000Z",
    "completedAt": null
  },
  {
    "id": "b",
    "title": "Keep me",
    "status": "pending",
    "category": "project",
    "project": null,
    "createdAt": "2024-05-01T10:05:00.000Z",
    "completedAt": null
  }
]"#;
        fs::write(storage.tasks_file(), content).expect("write");

        let loaded = storage.load().expect("load");
        assert!(loaded.issue.is_none());
        assert_eq!(loaded.tasks.len(), 2);
        assert_eq!(loaded.tasks[1].title, "Keep me");
        assert!(loaded.tasks[1].project().is_none());

        storage.write_all(&loaded.tasks).expect("rewrite");
        assert_eq!(fs::read_to_string(storage.tasks_file()).expect("read"), content);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let storage = storage(&temp);
        let task = Task::new("dup", Category::General);

        let err = storage
            .write_all(&[task.clone(), task.clone()])
            .unwrap_err();

        assert!(matches!(err, Error::DuplicateTaskId(ref id) if *id == task.id));
        assert!(!storage.tasks_file().exists());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let temp = TempDir::new().expect("tempdir");
        let storage = storage(&temp);
        storage
            .write_all(&[Task::new("x", Category::General)])
            .expect("write");

        let leftovers: Vec<_> = fs::read_dir(storage.dir())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
