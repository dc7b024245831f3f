//! Configuration loading and management
//!
//! Handles the application directory (`~/.lina` by default) and its
//! `config.json`, and resolves where `tasks.json` lives.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Name of the application directory under the user's home
pub const APP_DIR: &str = ".lina";

/// Configuration file inside the application directory
pub const CONFIG_FILE: &str = "config.json";

/// Task collection file inside the storage directory
pub const TASKS_FILE: &str = "tasks.json";

/// Persisted configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding `tasks.json`; may start with `~/`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<String>,
}

/// Keys accepted by `lina config get|set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Storage,
}

impl ConfigKey {
    pub const ALL: &'static [ConfigKey] = &[ConfigKey::Storage];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKey::Storage => "storage",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "storage" => Ok(ConfigKey::Storage),
            other => Err(Error::UnknownConfigKey(other.to_string())),
        }
    }
}

/// Resolves the application directory, config file, and storage paths.
///
/// Paths are computed once at construction; callers share one resolver per
/// process.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    app_dir: PathBuf,
    home_dir: Option<PathBuf>,
}

impl ConfigResolver {
    /// Resolver rooted at an explicit application directory.
    pub fn new(app_dir: PathBuf, home_dir: Option<PathBuf>) -> Self {
        Self { app_dir, home_dir }
    }

    /// Resolve from the user's home directory, or from `override_dir` when set
    /// (the `--home` flag / `LINA_HOME`).
    pub fn from_env(override_dir: Option<PathBuf>) -> Result<Self> {
        let home_dir = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf());
        let app_dir = match override_dir {
            Some(dir) => dir,
            None => home_dir
                .as_ref()
                .map(|home| home.join(APP_DIR))
                .ok_or_else(|| {
                    Error::OperationFailed("unable to determine home directory".to_string())
                })?,
        };
        Ok(Self::new(app_dir, home_dir))
    }

    pub fn app_dir(&self) -> &Path {
        &self.app_dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.app_dir.join(CONFIG_FILE)
    }

    /// Load `config.json`, falling back to defaults when it is missing or
    /// cannot be parsed.
    pub fn load(&self) -> Config {
        let path = self.config_path();
        if !path.exists() {
            return Config::default();
        }
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "unable to read config, using defaults");
                return Config::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "invalid config, using defaults");
                Config::default()
            }
        }
    }

    /// Write `config.json`, creating the application directory if needed.
    pub fn save(&self, config: &Config) -> Result<()> {
        fs::create_dir_all(&self.app_dir)?;
        let mut content = serde_json::to_string_pretty(config)?;
        content.push('\n');
        fs::write(self.config_path(), content)?;
        debug!(path = %self.config_path().display(), "config saved");
        Ok(())
    }

    pub fn get(&self, key: ConfigKey) -> Option<String> {
        let config = self.load();
        match key {
            ConfigKey::Storage => config.storage,
        }
    }

    pub fn set(&self, key: ConfigKey, value: &str) -> Result<Config> {
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::InvalidConfig(format!("{key} cannot be empty")));
        }
        let mut config = self.load();
        match key {
            ConfigKey::Storage => config.storage = Some(value.to_string()),
        }
        self.save(&config)?;
        Ok(config)
    }

    /// Directory holding `tasks.json`: the configured storage path (with `~/`
    /// expanded) or the application directory.
    pub fn storage_dir(&self) -> PathBuf {
        match self.load().storage {
            Some(storage) => self.expand_home(&storage),
            None => self.app_dir.clone(),
        }
    }

    pub fn tasks_file_path(&self) -> PathBuf {
        self.storage_dir().join(TASKS_FILE)
    }

    fn expand_home(&self, raw: &str) -> PathBuf {
        match (raw.strip_prefix("~/"), &self.home_dir) {
            (Some(rest), Some(home)) => home.join(rest),
            _ if raw == "~" => self.home_dir.clone().unwrap_or_else(|| PathBuf::from(raw)),
            _ => PathBuf::from(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn resolver(temp: &TempDir) -> ConfigResolver {
        let home = temp.path().join("home");
        ConfigResolver::new(home.join(APP_DIR), Some(home))
    }

    #[test]
    fn missing_config_uses_defaults() {
        let temp = TempDir::new().expect("tempdir");
        let resolver = resolver(&temp);

        assert_eq!(resolver.load(), Config::default());
        assert_eq!(resolver.storage_dir(), resolver.app_dir());
        assert_eq!(
            resolver.tasks_file_path(),
            temp.path().join("home/.lina/tasks.json")
        );
    }

    #[test]
    fn storage_override_expands_home() {
        let temp = TempDir::new().expect("tempdir");
        let resolver = resolver(&temp);

        resolver
            .set(ConfigKey::Storage, "~/Dropbox/lina")
            .expect("set storage");

        assert_eq!(
            resolver.storage_dir(),
            temp.path().join("home/Dropbox/lina")
        );
        assert_eq!(
            resolver.get(ConfigKey::Storage).as_deref(),
            Some("~/Dropbox/lina")
        );
    }

    #[test]
    fn absolute_storage_path_is_used_as_is() {
        let temp = TempDir::new().expect("tempdir");
        let resolver = resolver(&temp);
        let target = temp.path().join("elsewhere");

        resolver
            .set(ConfigKey::Storage, target.to_str().expect("utf8 path"))
            .expect("set storage");

        assert_eq!(resolver.tasks_file_path(), target.join(TASKS_FILE));
    }

    #[test]
    fn corrupt_config_falls_back_to_defaults() {
        let temp = TempDir::new().expect("tempdir");
        let resolver = resolver(&temp);
        fs::create_dir_all(resolver.app_dir()).expect("mkdir");
        fs::write(resolver.config_path(), "{ not json").expect("write");

        assert_eq!(resolver.load(), Config::default());
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "color".parse::<ConfigKey>().unwrap_err();
        assert!(matches!(err, Error::UnknownConfigKey(ref key) if key == "color"));
        assert!(err.to_string().contains("storage"));
    }

    #[test]
    fn empty_value_is_rejected() {
        let temp = TempDir::new().expect("tempdir");
        let resolver = resolver(&temp);

        let err = resolver.set(ConfigKey::Storage, "  ").unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(_)));
        assert!(!resolver.config_path().exists());
    }
}
