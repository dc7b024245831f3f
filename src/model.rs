//! Task records and their on-disk representation.
//!
//! In memory a task's category and project name are a single tagged value
//! ([`Category`]). On disk they are flattened back into the `category` and
//! `project` fields that other tools read.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Separator for declaring several tasks in one title argument.
pub const TITLE_DELIMITER: char = '|';

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    /// Single-character marker used in list output.
    pub fn marker(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "○",
            TaskStatus::Completed => "✓",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fieldless discriminant of [`Category`], used for filtering.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Project,
    General,
    Office,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Project => "project",
            CategoryKind::General => "general",
            CategoryKind::Office => "office",
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a task. Only project-scoped tasks carry a project name.
///
/// `Project` holds an empty name for records that were filed as project tasks
/// without one; [`Category::project_name`] reports those as nameless.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Category {
    General,
    Office,
    Project(String),
}

impl Category {
    /// Build a project category, rejecting blank names.
    pub fn project(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidArgument(
                "project name cannot be empty".to_string(),
            ));
        }
        Ok(Category::Project(trimmed.to_string()))
    }

    pub fn kind(&self) -> CategoryKind {
        match self {
            Category::General => CategoryKind::General,
            Category::Office => CategoryKind::Office,
            Category::Project(_) => CategoryKind::Project,
        }
    }

    pub fn project_name(&self) -> Option<&str> {
        match self {
            Category::Project(name) if !name.trim().is_empty() => Some(name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TaskRecord", into = "TaskRecord")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub category: Category,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a pending task with a fresh id. The title must already be trimmed.
    pub fn new(title: impl Into<String>, category: Category) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            status: TaskStatus::Pending,
            category,
            created_at: now(),
            completed_at: None,
        }
    }

    pub fn project(&self) -> Option<&str> {
        self.category.project_name()
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// One-line rendering shared by the list command and the TUI.
    pub fn summary_line(&self) -> String {
        let mut line = format!("{} {}", self.status.marker(), self.title);
        match self.category.project_name() {
            Some(name) => line.push_str(&format!(" [{name}]")),
            None => line.push_str(&format!(" ({})", self.category.kind())),
        }
        line
    }
}

/// Current time at the precision stored on disk.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Split a raw title argument on `|`, trimming and dropping empty parts.
pub fn split_titles(input: &str) -> Vec<String> {
    input
        .split(TITLE_DELIMITER)
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect()
}

/// Wire shape of a task in `tasks.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    pub category: CategoryKind,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "iso_millis_opt")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<TaskRecord> for Task {
    fn from(record: TaskRecord) -> Self {
        let category = match record.category {
            CategoryKind::General => Category::General,
            CategoryKind::Office => Category::Office,
            CategoryKind::Project => Category::Project(record.project.unwrap_or_default()),
        };
        Task {
            id: record.id,
            title: record.title,
            status: record.status,
            category,
            created_at: record.created_at,
            completed_at: record.completed_at,
        }
    }
}

impl From<Task> for TaskRecord {
    fn from(task: Task) -> Self {
        let kind = task.category.kind();
        let project = match task.category {
            Category::Project(name) if !name.is_empty() => Some(name),
            _ => None,
        };
        TaskRecord {
            id: task.id,
            title: task.title,
            status: task.status,
            category: kind,
            project,
            created_at: task.created_at,
            completed_at: task.completed_at,
        }
    }
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

mod iso_millis_opt {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(value) => {
                serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|value| {
            DateTime::parse_from_rfc3339(&value)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(serde::de::Error::custom)
        })
        .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_titles_drops_blank_parts() {
        assert_eq!(
            split_titles("Buy milk | Call bank"),
            vec!["Buy milk".to_string(), "Call bank".to_string()]
        );
        assert_eq!(split_titles(" | |  "), Vec::<String>::new());
        assert_eq!(split_titles("single"), vec!["single".to_string()]);
    }

    #[test]
    fn new_task_starts_pending() {
        let task = Task::new("Write docs", Category::Office);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.completed_at.is_none());
        assert!(task.project().is_none());
        assert!(Uuid::parse_str(&task.id).is_ok());
    }

    #[test]
    fn project_category_rejects_blank_name() {
        assert!(Category::project("   ").is_err());
        assert_eq!(
            Category::project(" acme ").expect("project"),
            Category::Project("acme".to_string())
        );
    }

    #[test]
    fn wire_format_uses_camel_case_and_null_project() {
        let task = Task::new("Call bank", Category::General);
        let value = serde_json::to_value(&task).expect("serialize");
        assert_eq!(value["category"], "general");
        assert!(value["project"].is_null());
        assert!(value["completedAt"].is_null());
        assert_eq!(value["status"], "pending");
        let created = value["createdAt"].as_str().expect("createdAt string");
        assert!(created.ends_with('Z'));
        assert_eq!(created.len(), "2024-01-01T00:00:00.000Z".len());
    }

    #[test]
    fn decodes_records_written_by_other_tools() {
        let raw = r#"{
            "id": "0b7c1c39-5ad2-4b1f-9b7e-4a1d1b0f0a11",
            "title": "Ship release",
            "status": "completed",
            "category": "project",
            "project": "acme",
            "createdAt": "2024-05-01T10:00:00.000Z",
            "completedAt": "2024-05-02T11:30:00.250Z"
        }"#;
        let task: Task = serde_json::from_str(raw).expect("decode");
        assert_eq!(task.category, Category::Project("acme".to_string()));
        assert!(task.is_completed());
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn project_category_without_name_is_kept_nameless() {
        let raw = r#"{
            "id": "x",
            "title": "Orphan",
            "status": "pending",
            "category": "project",
            "project": null,
            "createdAt": "2024-05-01T10:00:00.000Z",
            "completedAt": null
        }"#;
        let task: Task = serde_json::from_str(raw).expect("decode");
        assert_eq!(task.category.kind(), CategoryKind::Project);
        assert!(task.project().is_none());
        assert_eq!(task.summary_line(), "○ Orphan (project)");

        let value = serde_json::to_value(&task).expect("serialize");
        assert_eq!(value["category"], "project");
        assert!(value["project"].is_null());
    }

    #[test]
    fn summary_line_marks_status_and_scope() {
        let mut task = Task::new("Deploy", Category::Project("acme".to_string()));
        assert_eq!(task.summary_line(), "○ Deploy [acme]");
        task.status = TaskStatus::Completed;
        task.category = Category::Office;
        assert_eq!(task.summary_line(), "✓ Deploy (office)");
    }
}
