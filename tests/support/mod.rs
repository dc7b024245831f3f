#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use git2::Repository;
use serde_json::Value;
use tempfile::TempDir;

/// Isolated lina home plus a scratch area for git repositories.
pub struct TestEnv {
    dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Result<Self, std::io::Error> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("outside"))?;
        Ok(Self { dir })
    }

    /// Application directory passed as `LINA_HOME`.
    pub fn app_dir(&self) -> PathBuf {
        self.dir.path().join("home").join(".lina")
    }

    pub fn tasks_file(&self) -> PathBuf {
        self.app_dir().join("tasks.json")
    }

    /// A directory that is not inside any git repository.
    pub fn outside_dir(&self) -> PathBuf {
        self.dir.path().join("outside")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a git repository whose working tree is named `name`.
    pub fn init_repo(&self, name: &str) -> Result<PathBuf, git2::Error> {
        let path = self.dir.path().join("repos").join(name);
        fs::create_dir_all(&path).map_err(|err| git2::Error::from_str(&err.to_string()))?;
        let repo = Repository::init(&path)?;
        set_identity(&repo)?;
        Ok(path)
    }

    /// `lina` running outside any repository.
    pub fn lina(&self) -> Command {
        self.lina_in(&self.outside_dir())
    }

    /// `lina` running with `cwd` as the working directory.
    pub fn lina_in(&self, cwd: &Path) -> Command {
        let mut cmd = Command::cargo_bin("lina").expect("binary");
        cmd.current_dir(cwd)
            .env("LINA_HOME", self.app_dir())
            .env_remove("LINA_REPO")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn read_tasks(&self) -> Result<Vec<Value>, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(self.tasks_file())?;
        let value: Value = serde_json::from_str(&contents)?;
        Ok(value.as_array().cloned().unwrap_or_default())
    }

    /// Run `lina --json add ...` outside a repo and return the created ids.
    pub fn add_tasks(&self, args: &[&str]) -> Result<Vec<String>, Box<dyn std::error::Error>> {
        let output = self
            .lina()
            .arg("--json")
            .arg("add")
            .args(args)
            .output()?;
        assert!(output.status.success(), "add failed: {output:?}");
        let value: Value = serde_json::from_slice(&output.stdout)?;
        let ids = value["data"]["tasks"]
            .as_array()
            .map(|tasks| {
                tasks
                    .iter()
                    .filter_map(|task| task["id"].as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default();
        Ok(ids)
    }
}

pub fn parse_json(stdout: &[u8]) -> Result<Value, serde_json::Error> {
    serde_json::from_slice(stdout)
}

fn set_identity(repo: &Repository) -> Result<(), git2::Error> {
    let mut cfg = repo.config()?;
    cfg.set_str("user.name", "lina-test")?;
    cfg.set_str("user.email", "lina-test@example.com")?;
    Ok(())
}
