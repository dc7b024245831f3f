//! Filter criteria over the task collection.
//!
//! A [`TaskFilter`] is a conjunction of optional predicates. An absent
//! criterion places no constraint; there is no OR and no negation.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::model::{CategoryKind, Task, TaskStatus};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    /// Case-insensitive substring of the title
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl TaskFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_project(project: impl Into<String>) -> Self {
        Self {
            project: Some(project.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.project.is_none()
            && self.status.is_none()
            && self.search.is_none()
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(category) = self.category {
            if task.category.kind() != category {
                return false;
            }
        }
        if let Some(project) = self.project.as_deref() {
            if task.project() != Some(project) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(search) = self.search.as_deref() {
            let needle = search.to_lowercase();
            if !task.title.to_lowercase().contains(&needle) {
                return false;
            }
        }
        true
    }

    /// Matching tasks in their original order.
    pub fn apply(&self, tasks: &[Task]) -> Vec<Task> {
        tasks
            .iter()
            .filter(|task| self.matches(task))
            .cloned()
            .collect()
    }

    /// Positions of matching tasks in `tasks`.
    pub fn indices(&self, tasks: &[Task]) -> Vec<usize> {
        tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| self.matches(task))
            .map(|(idx, _)| idx)
            .collect()
    }

    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "all tasks".to_string();
        }
        let mut parts = Vec::new();
        if let Some(status) = self.status {
            parts.push(status.to_string());
        }
        if let Some(category) = self.category {
            parts.push(category.to_string());
        }
        if let Some(project) = &self.project {
            parts.push(format!("project {project}"));
        }
        if let Some(search) = &self.search {
            parts.push(format!("matching \"{search}\""));
        }
        parts.join(", ")
    }
}

/// Sorted, de-duplicated project names present in `tasks`.
pub fn distinct_projects(tasks: &[Task]) -> Vec<String> {
    tasks
        .iter()
        .filter_map(|task| task.project())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
