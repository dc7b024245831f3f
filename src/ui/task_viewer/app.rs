use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::debug;

use crate::error::Result;
use crate::filter::{self, TaskFilter};
use crate::git::ProjectContext;
use crate::model::{CategoryKind, Task};
use crate::task::TaskStore;

use super::actions::{self, ActionOutcome};
use super::model;
use super::picker::{PickerAction, ProjectPicker, SearchPrompt};
use super::view;

const EVENT_POLL_MS: u64 = 120;
const WATCH_DEBOUNCE_MS: u64 = 200;

enum UiMsg {
    Reload,
    WatchError(String),
}

#[derive(Clone, Copy)]
pub(crate) enum StatusKind {
    Error,
    Info,
}

pub(crate) struct DeleteConfirmState {
    pub(crate) task_id: String,
    pub(crate) title: String,
}

#[derive(Default, Clone, Copy)]
struct Viewport {
    height: u16,
}

pub struct AppState {
    pub(crate) tasks: Vec<Task>,
    pub(crate) filtered: Vec<usize>,
    pub(crate) selected: Option<usize>,
    pub(crate) filter: TaskFilter,
    pub(crate) current_project: Option<String>,
    pub(crate) project_picker: Option<ProjectPicker>,
    pub(crate) search_prompt: Option<SearchPrompt>,
    pub(crate) delete_confirm: Option<DeleteConfirmState>,
    pub(crate) show_help: bool,
    info_message: Option<String>,
    status_message: Option<String>,
    load_warning: Option<String>,
    watch_error: Option<String>,
    viewport: Viewport,
    store: TaskStore,
}

impl AppState {
    fn new(store: TaskStore, current_project: Option<String>) -> Self {
        Self {
            tasks: Vec::new(),
            filtered: Vec::new(),
            selected: None,
            filter: model::initial_filter(current_project.as_deref()),
            current_project,
            project_picker: None,
            search_prompt: None,
            delete_confirm: None,
            show_help: false,
            info_message: None,
            status_message: None,
            load_warning: None,
            watch_error: None,
            viewport: Viewport::default(),
            store,
        }
    }

    pub(crate) fn selected_task(&self) -> Option<&Task> {
        self.selected.and_then(|idx| self.tasks.get(idx))
    }

    pub(crate) fn status_line(&self) -> Option<(String, StatusKind)> {
        if let Some(message) = self.status_message.as_ref() {
            return Some((message.clone(), StatusKind::Error));
        }
        if let Some(error) = self.watch_error.as_ref() {
            return Some((error.clone(), StatusKind::Error));
        }
        if let Some(warning) = self.load_warning.as_ref() {
            return Some((warning.clone(), StatusKind::Error));
        }
        if let Some(info) = self.info_message.as_ref() {
            return Some((info.clone(), StatusKind::Info));
        }
        None
    }

    pub(crate) fn footer_hint(&self) -> String {
        if self.delete_confirm.is_some() {
            return "y/enter confirm delete  esc/n cancel".to_string();
        }
        if self.project_picker.is_some() {
            return "j/k move  enter apply  esc cancel".to_string();
        }
        if self.search_prompt.is_some() {
            return "type to search  backspace delete  enter apply  esc cancel".to_string();
        }
        "j/k move  c complete  u uncomplete  d delete  a/p/g/o/r filter  s project  / search  ? help  q quit"
            .to_string()
    }

    pub(crate) fn task_count_summary(&self) -> String {
        let (pending, completed) = model::status_counts(&self.tasks, &self.filtered);
        format!(
            "showing: {}  pending: {pending}  completed: {completed}  total: {}",
            self.filtered.len(),
            self.tasks.len()
        )
    }

    fn reload(&mut self) {
        let previous_id = self.selected_task().map(|task| task.id.clone());
        match self.store.load() {
            Ok(loaded) => {
                self.tasks = loaded.tasks;
                self.load_warning = loaded.issue.map(|issue| issue.message());
            }
            Err(err) => {
                self.status_message = Some(format!("load error: {err}"));
            }
        }
        self.apply_filter(previous_id);
    }

    fn apply_filter(&mut self, previous_id: Option<String>) {
        self.filtered = self.filter.indices(&self.tasks);
        self.selected = model::select_by_id(&self.tasks, &self.filtered, previous_id.as_deref());
    }

    fn set_filter(&mut self, next: TaskFilter) {
        self.filter = next;
        let previous = self.selected_task().map(|task| task.id.clone());
        self.apply_filter(previous);
        self.set_info(format!("showing {}", self.filter.describe()));
    }

    fn move_selection(&mut self, delta: isize) {
        if self.filtered.is_empty() {
            self.selected = None;
            return;
        }
        let current_pos = self
            .selected
            .and_then(|idx| self.filtered.iter().position(|candidate| *candidate == idx))
            .unwrap_or(0);
        let max = self.filtered.len().saturating_sub(1);
        let next = (current_pos as isize + delta).clamp(0, max as isize) as usize;
        self.selected = Some(self.filtered[next]);
    }

    fn move_to_edge(&mut self, last: bool) {
        self.selected = if last {
            self.filtered.last().copied()
        } else {
            self.filtered.first().copied()
        };
    }

    fn list_jump(&self) -> isize {
        let height = self.viewport.height.saturating_sub(6);
        (height / 2).max(1) as isize
    }

    fn set_error(&mut self, message: String) {
        self.status_message = Some(message);
        self.info_message = None;
    }

    fn set_info(&mut self, message: String) {
        self.info_message = Some(message);
        self.status_message = None;
    }

    fn apply_outcome(&mut self, outcome: ActionOutcome) {
        if outcome.changed {
            self.reload();
        }
        if let Some(task_id) = outcome.task_id {
            self.selected = model::select_by_id(&self.tasks, &self.filtered, Some(&task_id));
        }
        self.set_info(outcome.message);
    }

    fn open_project_picker(&mut self) {
        let projects = filter::distinct_projects(&self.tasks);
        if projects.is_empty() {
            self.set_info("no projects yet".to_string());
            return;
        }
        let current = self
            .filter
            .project
            .clone()
            .or_else(|| self.current_project.clone());
        self.project_picker = Some(ProjectPicker::new(projects, current.as_deref()));
    }
}

pub fn run(store: TaskStore, project: &dyn ProjectContext) -> Result<()> {
    let storage_dir = store.storage().dir().to_path_buf();
    let mut app = AppState::new(store, project.current_project_name());
    // First load provisions the storage directory the watcher attaches to.
    app.reload();

    let (ui_tx, ui_rx) = mpsc::channel();
    spawn_watch(storage_dir, ui_tx);
    run_terminal(&mut app, ui_rx)
}

fn run_terminal(app: &mut AppState, ui_rx: Receiver<UiMsg>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    app.viewport.height = terminal.size()?.height;

    let result = run_loop(&mut terminal, app, ui_rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut AppState,
    ui_rx: Receiver<UiMsg>,
) -> Result<()> {
    let mut dirty = true;
    loop {
        while let Ok(msg) = ui_rx.try_recv() {
            handle_ui_msg(app, msg);
            dirty = true;
        }

        if dirty {
            terminal.draw(|frame| {
                app.viewport.height = frame.size().height;
                view::render(frame, app);
            })?;
            dirty = false;
        }

        if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
            match event::read()? {
                Event::Key(key) => {
                    if handle_key(app, key) {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(_, height) => {
                    app.viewport.height = height;
                    dirty = true;
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn handle_ui_msg(app: &mut AppState, msg: UiMsg) {
    match msg {
        UiMsg::Reload => {
            debug!("task file changed, reloading");
            app.reload();
        }
        UiMsg::WatchError(err) => {
            app.watch_error = Some(format!("watch error: {err}"));
        }
    }
}

/// Returns `true` when the viewer should exit.
fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if let Some(confirm) = app.delete_confirm.take() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('d') | KeyCode::Enter => {
                match actions::delete_task(&app.store, &confirm.task_id) {
                    Ok(outcome) => app.apply_outcome(outcome),
                    Err(err) => app.set_error(err.to_string()),
                }
            }
            KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => {
                app.set_info("cancelled".to_string());
            }
            _ => {
                app.delete_confirm = Some(confirm);
            }
        }
        return false;
    }

    if let Some(mut picker) = app.project_picker.take() {
        match picker.handle_key(key) {
            PickerAction::None => app.project_picker = Some(picker),
            PickerAction::Cancel => {}
            PickerAction::Confirm => {
                if let Some(project) = picker.selected_project() {
                    let next = model::show_project(project);
                    app.set_filter(next);
                }
            }
        }
        return false;
    }

    if let Some(mut prompt) = app.search_prompt.take() {
        match prompt.handle_key(key) {
            PickerAction::None => app.search_prompt = Some(prompt),
            PickerAction::Cancel => {}
            PickerAction::Confirm => {
                let next = model::with_search(&app.filter, prompt.value());
                if next != app.filter {
                    app.set_filter(next);
                }
            }
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return true,
        KeyCode::Char('?') | KeyCode::Char('h') => app.show_help = !app.show_help,
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::PageDown => app.move_selection(app.list_jump()),
        KeyCode::PageUp => app.move_selection(-app.list_jump()),
        KeyCode::Home => app.move_to_edge(false),
        KeyCode::End | KeyCode::Char('G') => app.move_to_edge(true),
        KeyCode::Char('c') => {
            if let Some(id) = app.selected_task().map(|task| task.id.clone()) {
                match actions::complete_task(&app.store, &id) {
                    Ok(outcome) => app.apply_outcome(outcome),
                    Err(err) => app.set_error(err.to_string()),
                }
            }
        }
        KeyCode::Char('u') => {
            if let Some(id) = app.selected_task().map(|task| task.id.clone()) {
                match actions::uncomplete_task(&app.store, &id) {
                    Ok(outcome) => app.apply_outcome(outcome),
                    Err(err) => app.set_error(err.to_string()),
                }
            }
        }
        KeyCode::Char('d') => {
            if let Some(task) = app.selected_task() {
                app.delete_confirm = Some(DeleteConfirmState {
                    task_id: task.id.clone(),
                    title: task.title.clone(),
                });
            }
        }
        KeyCode::Char('a') => {
            let next = model::show_all(&app.filter);
            app.set_filter(next);
        }
        KeyCode::Char('p') => {
            let next = model::show_pending(&app.filter);
            app.set_filter(next);
        }
        KeyCode::Char('g') => {
            let next = model::show_category(&app.filter, CategoryKind::General);
            app.set_filter(next);
        }
        KeyCode::Char('o') => {
            let next = model::show_category(&app.filter, CategoryKind::Office);
            app.set_filter(next);
        }
        KeyCode::Char('r') => {
            if app.current_project.is_none() {
                app.set_info("not in a git repository".to_string());
            } else {
                let next = model::show_current_project(&app.filter, app.current_project.as_deref());
                app.set_filter(next);
            }
        }
        KeyCode::Char('s') => app.open_project_picker(),
        KeyCode::Char('/') => {
            app.search_prompt = Some(SearchPrompt::new(app.filter.search.as_deref()));
        }
        _ => {}
    }
    false
}

fn spawn_watch(storage_dir: PathBuf, ui_tx: Sender<UiMsg>) {
    if !storage_dir.exists() {
        return;
    }

    thread::spawn(move || {
        let (event_tx, event_rx) = mpsc::channel();
        let watcher: notify::Result<RecommendedWatcher> = notify::recommended_watcher(move |res| {
            let _ = event_tx.send(res);
        });

        let mut watcher = match watcher {
            Ok(watcher) => watcher,
            Err(err) => {
                let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                return;
            }
        };

        if let Err(err) = watcher.watch(&storage_dir, RecursiveMode::NonRecursive) {
            let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
            return;
        }

        let debounce = Duration::from_millis(WATCH_DEBOUNCE_MS);
        let mut pending: Option<Instant> = None;

        loop {
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(Duration::from_secs(3600));
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(_)) => {
                    pending = Some(Instant::now() + debounce);
                }
                Ok(Err(err)) => {
                    let _ = ui_tx.send(UiMsg::WatchError(err.to_string()));
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if pending.is_some() {
                        pending = None;
                        if ui_tx.send(UiMsg::Reload).is_err() {
                            break;
                        }
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
    });
}
