//! lina task command implementations.

use std::path::PathBuf;

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use crate::cli::{load_context, ScopeArgs};
use crate::error::{Error, Result};
use crate::filter::TaskFilter;
use crate::git::ProjectContext;
use crate::model::{split_titles, Category, CategoryKind, Task, TaskStatus};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::task::Transition;

pub struct AddOptions {
    pub title: String,
    pub scope: ScopeArgs,
    pub home: Option<PathBuf>,
    pub repo: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct ListOptions {
    pub all: bool,
    pub scope: ScopeArgs,
    pub completed: bool,
    pub pending: bool,
    pub search: Option<String>,
    pub home: Option<PathBuf>,
    pub repo: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct StatusOptions {
    pub id: String,
    pub home: Option<PathBuf>,
    pub repo: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

pub struct DeleteOptions {
    pub id: String,
    pub home: Option<PathBuf>,
    pub repo: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct TaskAddOutput {
    category: CategoryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<String>,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct TaskListOutput {
    filter: TaskFilter,
    total: usize,
    pending: usize,
    completed: usize,
    tasks: Vec<Task>,
}

#[derive(Serialize)]
struct TaskStatusOutput {
    changed: bool,
    task: Task,
}

#[derive(Serialize)]
struct TaskDeleteOutput {
    task: Task,
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let titles = split_titles(&options.title);
    if titles.is_empty() {
        return Err(Error::InvalidArgument(
            "task title cannot be empty".to_string(),
        ));
    }

    let ctx = load_context(options.home, options.repo)?;
    let category = resolve_category(&options.scope, || ctx.project())?;
    let created = ctx.store.add(&titles, category.clone())?;

    let mut human = HumanOutput::new(format!("✓ {} task(s) added", created.len()));
    if let Some(project) = category.project_name() {
        human.push_summary("Project", project);
    }
    human.push_summary("Category", category.kind().as_str());
    for task in &created {
        human.push_detail(format!("\"{}\" (ID: {})", task.title, task.id));
    }

    let output = TaskAddOutput {
        category: category.kind(),
        project: category.project_name().map(str::to_string),
        tasks: created,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "add",
        &output,
        Some(&human),
    )
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let ctx = load_context(options.home, options.repo)?;

    let mut filter = scope_filter(options.all, &options.scope, || ctx.project());
    if options.completed {
        filter.status = Some(TaskStatus::Completed);
    } else if options.pending {
        filter.status = Some(TaskStatus::Pending);
    }
    filter.search = options
        .search
        .map(|search| search.trim().to_string())
        .filter(|search| !search.is_empty());

    let loaded = ctx.store.load()?;
    let tasks = filter.apply(&loaded.tasks);
    let (completed, pending): (Vec<&Task>, Vec<&Task>) =
        tasks.iter().partition(|task| task.is_completed());

    let mut human = HumanOutput::new(format!("Tasks: {}", filter.describe()));
    if let Some(issue) = &loaded.issue {
        human.push_warning(issue.message());
    }
    if tasks.is_empty() {
        human.push_summary("No tasks found.", "");
    } else {
        if !pending.is_empty() {
            human.push_section("Pending Tasks", render_tasks(&pending));
        }
        if !completed.is_empty() {
            human.push_section("Completed Tasks", render_tasks(&completed));
        }
        human.push_summary(
            "Total",
            format!(
                "{} tasks ({} pending, {} completed)",
                tasks.len(),
                pending.len(),
                completed.len()
            ),
        );
    }

    let output = TaskListOutput {
        total: tasks.len(),
        pending: pending.len(),
        completed: completed.len(),
        filter,
        tasks,
    };

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "list",
        &output,
        Some(&human),
    )
}

pub fn run_complete(options: StatusOptions) -> Result<()> {
    let ctx = load_context(options.home, options.repo)?;
    let transition = ctx.store.complete(&options.id)?;
    let header = match &transition {
        Transition::Changed(task) => format!("✓ Task completed: \"{}\"", task.title),
        Transition::Unchanged(task) => format!("Task \"{}\" is already completed", task.title),
    };
    emit_transition(options.json, options.quiet, "complete", header, transition)
}

pub fn run_uncomplete(options: StatusOptions) -> Result<()> {
    let ctx = load_context(options.home, options.repo)?;
    let transition = ctx.store.reopen(&options.id)?;
    let header = match &transition {
        Transition::Changed(task) => format!("○ Task marked as pending: \"{}\"", task.title),
        Transition::Unchanged(task) => format!("Task \"{}\" is already pending", task.title),
    };
    emit_transition(options.json, options.quiet, "uncomplete", header, transition)
}

pub fn run_delete(options: DeleteOptions) -> Result<()> {
    let ctx = load_context(options.home, options.repo)?;
    let task = ctx.store.delete(&options.id)?;

    let mut human = HumanOutput::new(format!("✓ Task deleted: \"{}\"", task.title));
    human.push_summary("ID", task.id.clone());

    emit_success(
        OutputOptions {
            json: options.json,
            quiet: options.quiet,
        },
        "delete",
        &TaskDeleteOutput { task },
        Some(&human),
    )
}

/// Category from explicit flags, else the current git project. `project` is
/// only consulted when no flag was given.
fn resolve_category<P: ProjectContext>(
    scope: &ScopeArgs,
    project: impl FnOnce() -> P,
) -> Result<Category> {
    if scope.general {
        return Ok(Category::General);
    }
    if scope.office {
        return Ok(Category::Office);
    }
    if let Some(name) = scope.project.as_deref() {
        return Category::project(name);
    }
    match project().current_project_name() {
        Some(name) => Category::project(name),
        None => Err(Error::NotInProject),
    }
}

/// Base filter for `list` before status and search flags. A blank `-p` counts
/// as no flag.
fn scope_filter<P: ProjectContext>(
    all: bool,
    scope: &ScopeArgs,
    project: impl FnOnce() -> P,
) -> TaskFilter {
    let named_project = scope
        .project
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    if all {
        TaskFilter::all()
    } else if scope.general {
        TaskFilter {
            category: Some(CategoryKind::General),
            ..TaskFilter::default()
        }
    } else if scope.office {
        TaskFilter {
            category: Some(CategoryKind::Office),
            ..TaskFilter::default()
        }
    } else if let Some(name) = named_project {
        TaskFilter::for_project(name)
    } else {
        match project().current_project_name() {
            Some(name) => TaskFilter::for_project(name),
            None => TaskFilter::all(),
        }
    }
}

fn emit_transition(
    json: bool,
    quiet: bool,
    command: &str,
    header: String,
    transition: Transition,
) -> Result<()> {
    let changed = transition.changed();
    let task = transition.into_task();

    let mut human = HumanOutput::new(header);
    human.push_summary("ID", task.id.clone());

    emit_success(
        OutputOptions { json, quiet },
        command,
        &TaskStatusOutput { changed, task },
        Some(&human),
    )
}

fn render_tasks(tasks: &[&Task]) -> Vec<String> {
    let mut lines = Vec::new();
    for task in tasks {
        lines.push(task.summary_line());
        lines.push(format!(
            "  ID: {} | Created: {}",
            task.id,
            format_timestamp(task.created_at)
        ));
        if let Some(completed_at) = task.completed_at {
            lines.push(format!("  Completed: {}", format_timestamp(completed_at)));
        }
        lines.push(String::new());
    }
    lines
}

fn format_timestamp(value: DateTime<Utc>) -> String {
    value
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::FixedContext;

    #[test]
    fn explicit_flags_win_over_git_project() {
        let project = FixedContext(Some("acme".to_string()));
        let scope = ScopeArgs {
            office: true,
            ..ScopeArgs::default()
        };
        assert_eq!(
            resolve_category(&scope, || project).expect("category"),
            Category::Office
        );
    }

    #[test]
    fn defaults_to_current_project() {
        let project = FixedContext(Some("acme".to_string()));
        assert_eq!(
            resolve_category(&ScopeArgs::default(), || project).expect("category"),
            Category::Project("acme".to_string())
        );
    }

    #[test]
    fn outside_project_without_flag_is_user_error() {
        let err = resolve_category(&ScopeArgs::default(), || FixedContext(None)).unwrap_err();
        assert!(matches!(err, Error::NotInProject));
        assert_eq!(err.exit_code(), crate::error::exit_codes::USER_ERROR);
    }

    #[test]
    fn explicit_flag_skips_project_detection() {
        let scope = ScopeArgs {
            general: true,
            ..ScopeArgs::default()
        };
        let category = resolve_category(&scope, || -> FixedContext {
            panic!("project lookup must not run")
        })
        .expect("category");
        assert_eq!(category, Category::General);

        let filter = scope_filter(true, &ScopeArgs::default(), || -> FixedContext {
            panic!("project lookup must not run")
        });
        assert!(filter.is_empty());
    }

    #[test]
    fn blank_project_flag_falls_back_to_default_scope() {
        let scope = ScopeArgs {
            project: Some("  ".to_string()),
            ..ScopeArgs::default()
        };
        assert_eq!(
            scope_filter(false, &scope, || FixedContext(Some("acme".to_string()))),
            TaskFilter::for_project("acme")
        );
        assert!(scope_filter(false, &scope, || FixedContext(None)).is_empty());
        assert_eq!(
            scope_filter(
                false,
                &ScopeArgs {
                    project: Some(" zeta ".to_string()),
                    ..ScopeArgs::default()
                },
                || FixedContext(None)
            ),
            TaskFilter::for_project("zeta")
        );
    }

    #[test]
    fn rendered_task_includes_id_and_completion() {
        let mut task = Task::new("Ship", Category::Project("acme".to_string()));
        task.status = TaskStatus::Completed;
        task.completed_at = Some(task.created_at);
        let lines = render_tasks(&[&task]);
        assert_eq!(lines[0], "✓ Ship [acme]");
        assert!(lines[1].starts_with(&format!("  ID: {} | Created: ", task.id)));
        assert!(lines[2].starts_with("  Completed: "));
        assert!(lines[3].is_empty());
    }
}
