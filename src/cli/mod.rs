//! Command-line interface for lina
//!
//! This module defines the CLI structure using clap derive macros.
//! Task commands live in `task`, configuration commands in `config`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::ConfigResolver;
use crate::error::Result;
use crate::git::GitContext;
use crate::storage::Storage;
use crate::task::TaskStore;
use crate::ui::task_viewer;

mod config;
mod task;

/// lina - personal task tracking from the terminal
///
/// Tasks are scoped to the current git project by default, or filed as
/// general or office tasks. Run without a subcommand to open the
/// interactive view.
#[derive(Parser, Debug)]
#[command(name = "lina")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Application directory holding config.json (defaults to ~/.lina)
    #[arg(long, global = true, env = "LINA_HOME")]
    pub home: Option<PathBuf>,

    /// Path used to detect the current git project (defaults to current directory)
    #[arg(long, global = true, env = "LINA_REPO")]
    pub repo: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add one or more tasks (separate titles with "|")
    Add {
        /// Task title, or several titles separated by "|"
        title: String,

        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// List tasks
    #[command(visible_alias = "ls")]
    List {
        /// Show tasks from every scope
        #[arg(short, long, conflicts_with_all = ["general", "office", "project"])]
        all: bool,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Only completed tasks
        #[arg(long, conflicts_with = "pending")]
        completed: bool,

        /// Only pending tasks
        #[arg(long)]
        pending: bool,

        /// Only tasks whose title contains this text (case-insensitive)
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Mark a task as completed
    Complete {
        /// Task ID
        id: String,
    },

    /// Mark a completed task as pending again
    #[command(visible_alias = "reopen")]
    Uncomplete {
        /// Task ID
        id: String,
    },

    /// Delete a task
    #[command(visible_alias = "remove")]
    Delete {
        /// Task ID
        id: String,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigCommands>,
    },
}

/// Category flags shared by `add` and `list`
#[derive(Args, Debug, Default, Clone)]
pub struct ScopeArgs {
    /// General task (no project)
    #[arg(short, long, conflicts_with_all = ["office", "project"])]
    pub general: bool,

    /// Office task (no project)
    #[arg(short, long, conflicts_with = "project")]
    pub office: bool,

    /// Project task with an explicit project name
    #[arg(short, long, value_name = "NAME")]
    pub project: Option<String>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print a config value
    Get {
        /// Config key (available: storage)
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (available: storage)
        key: String,

        /// New value
        value: String,
    },
}

/// Resolved per-process state shared by every command.
pub(crate) struct Context {
    pub store: TaskStore,
    repo: Option<PathBuf>,
}

impl Context {
    /// Git discovery, run only by commands that need a default project.
    pub fn project(&self) -> GitContext {
        GitContext::discover(self.repo.as_deref())
    }
}

pub(crate) fn load_context(home: Option<PathBuf>, repo: Option<PathBuf>) -> Result<Context> {
    let resolver = ConfigResolver::from_env(home)?;
    let storage = Storage::new(resolver.tasks_file_path());
    Ok(Context {
        store: TaskStore::new(storage),
        repo,
    })
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        let Some(command) = self.command else {
            let ctx = load_context(self.home, self.repo)?;
            let project = ctx.project();
            return task_viewer::run(ctx.store, &project);
        };

        match command {
            Commands::Add { title, scope } => task::run_add(task::AddOptions {
                title,
                scope,
                home: self.home,
                repo: self.repo,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::List {
                all,
                scope,
                completed,
                pending,
                search,
            } => task::run_list(task::ListOptions {
                all,
                scope,
                completed,
                pending,
                search,
                home: self.home,
                repo: self.repo,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Complete { id } => task::run_complete(task::StatusOptions {
                id,
                home: self.home,
                repo: self.repo,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Uncomplete { id } => task::run_uncomplete(task::StatusOptions {
                id,
                home: self.home,
                repo: self.repo,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Delete { id } => task::run_delete(task::DeleteOptions {
                id,
                home: self.home,
                repo: self.repo,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Config { action } => config::run(config::ConfigOptions {
                action,
                home: self.home,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}
