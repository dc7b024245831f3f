//! lina - personal task tracking library
//!
//! This library provides the core functionality for the lina CLI and its
//! interactive terminal view.
//!
//! # Core Concepts
//!
//! - **Tasks**: short-lived todo items, pending or completed
//! - **Categories**: general, office, or scoped to a project
//! - **Projects**: free-text labels, by default the enclosing git working tree
//! - **Filters**: conjunctions of category, project, status, and title search
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Application directory and `config.json`
//! - `error`: Error types and result aliases
//! - `filter`: Filter criteria over the task collection
//! - `git`: Project context from the enclosing repository
//! - `model`: Task records and their JSON representation
//! - `output`: Human and JSON output for commands
//! - `storage`: Atomic read/write of `tasks.json`
//! - `task`: Add, update, complete, reopen, and delete operations
//! - `ui`: Interactive terminal view

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod git;
pub mod model;
pub mod output;
pub mod storage;
pub mod task;
pub mod ui;

pub use error::{Error, Result};
