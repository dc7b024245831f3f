//! Pure filter transitions and selection helpers for the task viewer.
//!
//! Each shortcut maps the current [`TaskFilter`] to the next one; the app
//! owns the value and re-applies it after every change or reload.

use crate::filter::TaskFilter;
use crate::model::{CategoryKind, Task, TaskStatus};

/// Filter the viewer opens with: the current project, or everything.
pub fn initial_filter(current_project: Option<&str>) -> TaskFilter {
    match current_project {
        Some(project) => TaskFilter::for_project(project),
        None => TaskFilter::all(),
    }
}

/// `a`: drop every criterion.
pub fn show_all(_filter: &TaskFilter) -> TaskFilter {
    TaskFilter::all()
}

/// `p`: pending only, across every category and project.
pub fn show_pending(filter: &TaskFilter) -> TaskFilter {
    TaskFilter {
        category: None,
        project: None,
        status: Some(TaskStatus::Pending),
        search: filter.search.clone(),
    }
}

/// `g` / `o`: one category, any status.
pub fn show_category(filter: &TaskFilter, category: CategoryKind) -> TaskFilter {
    TaskFilter {
        category: Some(category),
        project: None,
        status: None,
        search: filter.search.clone(),
    }
}

/// `r`: the repository's project, any status. Unchanged outside a repository.
pub fn show_current_project(filter: &TaskFilter, current_project: Option<&str>) -> TaskFilter {
    match current_project {
        Some(project) => TaskFilter {
            category: None,
            project: Some(project.to_string()),
            status: None,
            search: filter.search.clone(),
        },
        None => filter.clone(),
    }
}

/// `s`: replace the whole filter with a single project.
pub fn show_project(project: &str) -> TaskFilter {
    TaskFilter::for_project(project)
}

/// `/`: set the title search. Blank input keeps the current filter.
pub fn with_search(filter: &TaskFilter, input: &str) -> TaskFilter {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return filter.clone();
    }
    TaskFilter {
        search: Some(trimmed.to_string()),
        ..filter.clone()
    }
}

/// Keep the selection on `previous_id` when it is still visible.
pub fn select_by_id(tasks: &[Task], filtered: &[usize], previous_id: Option<&str>) -> Option<usize> {
    if filtered.is_empty() {
        return None;
    }
    if let Some(previous_id) = previous_id {
        if let Some(idx) = filtered
            .iter()
            .copied()
            .find(|idx| tasks.get(*idx).map(|task| task.id.as_str()) == Some(previous_id))
        {
            return Some(idx);
        }
    }
    filtered.first().copied()
}

/// Pending and completed counts for the visible tasks.
pub fn status_counts(tasks: &[Task], filtered: &[usize]) -> (usize, usize) {
    filtered
        .iter()
        .filter_map(|idx| tasks.get(*idx))
        .fold((0, 0), |(pending, completed), task| match task.status {
            TaskStatus::Pending => (pending + 1, completed),
            TaskStatus::Completed => (pending, completed + 1),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;

    fn busy_filter() -> TaskFilter {
        TaskFilter {
            category: Some(CategoryKind::Office),
            project: Some("acme".to_string()),
            status: Some(TaskStatus::Completed),
            search: Some("report".to_string()),
        }
    }

    #[test]
    fn initial_filter_uses_current_project() {
        assert_eq!(initial_filter(Some("acme")), TaskFilter::for_project("acme"));
        assert!(initial_filter(None).is_empty());
    }

    #[test]
    fn show_all_clears_everything() {
        assert!(show_all(&busy_filter()).is_empty());
    }

    #[test]
    fn pending_clears_category_and_project() {
        let next = show_pending(&busy_filter());
        assert_eq!(next.status, Some(TaskStatus::Pending));
        assert!(next.category.is_none());
        assert!(next.project.is_none());
    }

    #[test]
    fn category_clears_status_and_project() {
        let next = show_category(&busy_filter(), CategoryKind::General);
        assert_eq!(next.category, Some(CategoryKind::General));
        assert!(next.status.is_none());
        assert!(next.project.is_none());
    }

    #[test]
    fn current_project_clears_category_and_status() {
        let next = show_current_project(&busy_filter(), Some("zeta"));
        assert_eq!(next.project.as_deref(), Some("zeta"));
        assert!(next.category.is_none());
        assert!(next.status.is_none());

        assert_eq!(show_current_project(&busy_filter(), None), busy_filter());
    }

    #[test]
    fn project_picker_replaces_filter() {
        assert_eq!(show_project("acme"), TaskFilter::for_project("acme"));
    }

    #[test]
    fn blank_search_leaves_filter_unchanged() {
        let filter = busy_filter();
        assert_eq!(with_search(&filter, "   "), filter);
        assert_eq!(
            with_search(&filter, " milk ").search.as_deref(),
            Some("milk")
        );
    }

    #[test]
    fn selection_follows_previous_task() {
        let tasks = vec![
            Task::new("a", Category::General),
            Task::new("b", Category::General),
            Task::new("c", Category::General),
        ];
        let filtered = vec![0, 2];
        assert_eq!(select_by_id(&tasks, &filtered, Some(&tasks[2].id)), Some(2));
        assert_eq!(select_by_id(&tasks, &filtered, Some(&tasks[1].id)), Some(0));
        assert_eq!(select_by_id(&tasks, &[], None), None);
    }

    #[test]
    fn counts_cover_visible_tasks_only() {
        let mut done = Task::new("done", Category::General);
        done.status = TaskStatus::Completed;
        let tasks = vec![Task::new("open", Category::General), done, Task::new("x", Category::Office)];
        assert_eq!(status_counts(&tasks, &[0, 1]), (1, 1));
    }
}
