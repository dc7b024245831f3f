//! Project context inferred from the enclosing git repository.
//!
//! The project name is the basename of the repository's working tree, so
//! `~/code/acme/src` resolves to the project `acme`.

use std::path::{Path, PathBuf};

use git2::{ErrorCode, Repository};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Source of the "current project" used for defaults.
pub trait ProjectContext {
    fn is_inside_tracked_project(&self) -> bool;
    fn current_project_name(&self) -> Option<String>;
}

/// Discover a git repository from a starting path.
///
/// Returns `Ok(None)` when no repository encloses `start`.
pub fn discover_repo(start: Option<&Path>) -> Result<Option<Repository>> {
    let start_path = match start {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir()?,
    };

    match Repository::discover(&start_path) {
        Ok(repo) => Ok(Some(repo)),
        Err(err) if err.code() == ErrorCode::NotFound => Ok(None),
        Err(err) => Err(Error::Git(err)),
    }
}

/// Project context backed by `git2` repository discovery.
///
/// A repository that cannot be opened (wrong owner, broken `.git`) counts as
/// no repository at all.
#[derive(Debug, Clone, Default)]
pub struct GitContext {
    workdir: Option<PathBuf>,
}

impl GitContext {
    pub fn discover(start: Option<&Path>) -> Self {
        Self::from_discovery(discover_repo(start))
    }

    fn from_discovery(found: Result<Option<Repository>>) -> Self {
        let workdir = match found {
            Ok(repo) => repo.and_then(|repo| repo.workdir().map(Path::to_path_buf)),
            Err(err) => {
                warn!(error = %err, "git discovery failed, continuing without a project");
                None
            }
        };
        debug!(workdir = ?workdir, "project context resolved");
        Self { workdir }
    }
}

impl ProjectContext for GitContext {
    fn is_inside_tracked_project(&self) -> bool {
        self.workdir.is_some()
    }

    fn current_project_name(&self) -> Option<String> {
        self.workdir
            .as_deref()
            .and_then(project_name_for)
    }
}

/// Fixed context, for callers that already know the project.
#[derive(Debug, Clone, Default)]
pub struct FixedContext(pub Option<String>);

impl ProjectContext for FixedContext {
    fn is_inside_tracked_project(&self) -> bool {
        self.0.is_some()
    }

    fn current_project_name(&self) -> Option<String> {
        self.0.clone()
    }
}

fn project_name_for(workdir: &Path) -> Option<String> {
    workdir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty())
}
