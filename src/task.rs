//! Task mutation API.
//!
//! Every operation is a full read-modify-write of the collection held by
//! [`Storage`]. Validation runs before storage is touched, and a collection
//! that did not load cleanly is never written back.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::filter::{self, TaskFilter};
use crate::model::{now, Category, Task, TaskStatus};
use crate::storage::{Loaded, Storage};

pub use crate::model::split_titles;

/// Fields to merge into an existing task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub status: Option<TaskStatus>,
    /// `Some(None)` clears the completion time.
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl TaskUpdate {
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

/// Outcome of a status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The task moved to the target state and was written back
    Changed(Task),
    /// The task was already in the target state; nothing was written
    Unchanged(Task),
}

impl Transition {
    pub fn task(&self) -> &Task {
        match self {
            Transition::Changed(task) | Transition::Unchanged(task) => task,
        }
    }

    pub fn into_task(self) -> Task {
        match self {
            Transition::Changed(task) | Transition::Unchanged(task) => task,
        }
    }

    pub fn changed(&self) -> bool {
        matches!(self, Transition::Changed(_))
    }
}

#[derive(Debug, Clone)]
pub struct TaskStore {
    storage: Storage,
}

impl TaskStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn read_all(&self) -> Result<Vec<Task>> {
        self.storage.read_all()
    }

    pub fn load(&self) -> Result<Loaded> {
        self.storage.load()
    }

    /// Create one pending task per non-empty title and persist them together.
    pub fn add<S: AsRef<str>>(&self, titles: &[S], category: Category) -> Result<Vec<Task>> {
        let titles: Vec<&str> = titles
            .iter()
            .map(|title| title.as_ref().trim())
            .filter(|title| !title.is_empty())
            .collect();
        if titles.is_empty() {
            return Err(Error::InvalidArgument(
                "no valid task titles found".to_string(),
            ));
        }

        let created: Vec<Task> = titles
            .into_iter()
            .map(|title| Task::new(title, category.clone()))
            .collect();

        let mut tasks = self.storage.read_for_update()?;
        tasks.extend(created.iter().cloned());
        self.storage.write_all(&tasks)?;
        debug!(count = created.len(), category = %category.kind(), "tasks added");
        Ok(created)
    }

    pub fn find_by_id(&self, id: &str) -> Result<Option<Task>> {
        let tasks = self.storage.read_all()?;
        Ok(tasks.into_iter().find(|task| task.id == id))
    }

    pub fn get(&self, id: &str) -> Result<Task> {
        let id = validate_id(id)?;
        self.find_by_id(id)?
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))
    }

    /// Merge `update` into the task with `id` and persist.
    ///
    /// After the merge `completed_at` is present exactly when the status is
    /// completed: a completion without a timestamp is stamped with the current
    /// time, and a pending task loses its timestamp.
    pub fn update(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        let id = validate_id(id)?;
        let title = match update.title {
            Some(title) => {
                let trimmed = title.trim();
                if trimmed.is_empty() {
                    return Err(Error::InvalidArgument(
                        "task title cannot be empty".to_string(),
                    ));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let mut tasks = self.storage.read_for_update()?;
        let task = tasks
            .iter_mut()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(completed_at) = update.completed_at {
            task.completed_at = completed_at;
        }
        match task.status {
            TaskStatus::Completed => {
                if task.completed_at.is_none() {
                    task.completed_at = Some(now());
                }
            }
            TaskStatus::Pending => task.completed_at = None,
        }

        let updated = task.clone();
        self.storage.write_all(&tasks)?;
        debug!(id = %updated.id, status = %updated.status, "task updated");
        Ok(updated)
    }

    /// Remove the task with `id`, returning it.
    pub fn delete(&self, id: &str) -> Result<Task> {
        let id = validate_id(id)?;
        let mut tasks = self.storage.read_for_update()?;
        let before = tasks.len();
        let removed = tasks.iter().find(|task| task.id == id).cloned();
        tasks.retain(|task| task.id != id);
        let Some(removed) = removed.filter(|_| tasks.len() != before) else {
            return Err(Error::TaskNotFound(id.to_string()));
        };
        self.storage.write_all(&tasks)?;
        debug!(id = %removed.id, "task deleted");
        Ok(removed)
    }

    pub fn complete(&self, id: &str) -> Result<Transition> {
        self.transition(id, TaskStatus::Completed)
    }

    pub fn reopen(&self, id: &str) -> Result<Transition> {
        self.transition(id, TaskStatus::Pending)
    }

    fn transition(&self, id: &str, target: TaskStatus) -> Result<Transition> {
        let id = validate_id(id)?;
        let current = self
            .storage
            .read_for_update()?
            .into_iter()
            .find(|task| task.id == id)
            .ok_or_else(|| Error::TaskNotFound(id.to_string()))?;
        if current.status == target {
            return Ok(Transition::Unchanged(current));
        }
        let completed_at = match target {
            TaskStatus::Completed => Some(now()),
            TaskStatus::Pending => None,
        };
        let updated = self.update(
            &current.id,
            TaskUpdate {
                status: Some(target),
                completed_at: Some(completed_at),
                ..TaskUpdate::default()
            },
        )?;
        Ok(Transition::Changed(updated))
    }

    pub fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>> {
        let tasks = self.storage.read_all()?;
        Ok(filter.apply(&tasks))
    }

    pub fn projects(&self) -> Result<Vec<String>> {
        let tasks = self.storage.read_all()?;
        Ok(filter::distinct_projects(&tasks))
    }
}

fn validate_id(id: &str) -> Result<&str> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        return Err(Error::InvalidArgument("task ID is required".to_string()));
    }
    Ok(trimmed)
}
