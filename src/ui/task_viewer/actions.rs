use crate::error::Result;
use crate::task::{TaskStore, Transition};

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub changed: bool,
    pub message: String,
    pub task_id: Option<String>,
}

pub fn complete_task(store: &TaskStore, task_id: &str) -> Result<ActionOutcome> {
    let outcome = match store.complete(task_id)? {
        Transition::Changed(task) => ActionOutcome {
            changed: true,
            message: format!("completed: {}", task.title),
            task_id: Some(task.id),
        },
        Transition::Unchanged(task) => ActionOutcome {
            changed: false,
            message: format!("already completed: {}", task.title),
            task_id: Some(task.id),
        },
    };
    Ok(outcome)
}

pub fn uncomplete_task(store: &TaskStore, task_id: &str) -> Result<ActionOutcome> {
    let outcome = match store.reopen(task_id)? {
        Transition::Changed(task) => ActionOutcome {
            changed: true,
            message: format!("marked pending: {}", task.title),
            task_id: Some(task.id),
        },
        Transition::Unchanged(task) => ActionOutcome {
            changed: false,
            message: format!("already pending: {}", task.title),
            task_id: Some(task.id),
        },
    };
    Ok(outcome)
}

pub fn delete_task(store: &TaskStore, task_id: &str) -> Result<ActionOutcome> {
    let task = store.delete(task_id)?;
    Ok(ActionOutcome {
        changed: true,
        message: format!("deleted: {}", task.title),
        task_id: None,
    })
}
