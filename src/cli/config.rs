//! lina config command implementation.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::ConfigCommands;
use crate::config::{Config, ConfigKey, ConfigResolver};
use crate::error::Result;
use crate::output::{emit_success, HumanOutput, OutputOptions};

pub struct ConfigOptions {
    pub action: Option<ConfigCommands>,
    pub home: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
struct ConfigShowOutput {
    config: Config,
    config_path: PathBuf,
    storage_dir: PathBuf,
    tasks_file: PathBuf,
}

#[derive(Serialize)]
struct ConfigValueOutput {
    key: &'static str,
    value: Option<String>,
}

pub fn run(options: ConfigOptions) -> Result<()> {
    let resolver = ConfigResolver::from_env(options.home)?;
    let output_options = OutputOptions {
        json: options.json,
        quiet: options.quiet,
    };

    match options.action {
        None => show(&resolver, output_options),
        Some(ConfigCommands::Get { key }) => {
            let key: ConfigKey = key.parse()?;
            let value = resolver.get(key);
            let human = match value.as_deref() {
                Some(value) => HumanOutput::new(format!("{key}: {value}")),
                None => HumanOutput::new(format!(
                    "Config key \"{key}\" is not set (using default)"
                )),
            };
            emit_success(
                output_options,
                "config get",
                &ConfigValueOutput {
                    key: key.as_str(),
                    value,
                },
                Some(&human),
            )
        }
        Some(ConfigCommands::Set { key, value }) => {
            let key: ConfigKey = key.parse()?;
            resolver.set(key, &value)?;
            let stored = resolver.get(key);

            let mut human = HumanOutput::new(format!("✓ Config updated: {key} = {}", value.trim()));
            push_paths(&mut human, &resolver);
            emit_success(
                output_options,
                "config set",
                &ConfigValueOutput {
                    key: key.as_str(),
                    value: stored,
                },
                Some(&human),
            )
        }
    }
}

fn show(resolver: &ConfigResolver, options: OutputOptions) -> Result<()> {
    let config = resolver.load();

    let mut human = HumanOutput::new("Current configuration:");
    for key in ConfigKey::ALL {
        let value = match key {
            ConfigKey::Storage => config.storage.clone(),
        };
        human.push_detail(format!(
            "{key}: {}",
            value.as_deref().unwrap_or("(default)")
        ));
    }
    push_paths(&mut human, resolver);

    let output = ConfigShowOutput {
        config,
        config_path: resolver.config_path(),
        storage_dir: resolver.storage_dir(),
        tasks_file: resolver.tasks_file_path(),
    };

    emit_success(options, "config", &output, Some(&human))
}

fn push_paths(human: &mut HumanOutput, resolver: &ConfigResolver) {
    human.push_summary("Storage directory", resolver.storage_dir().display().to_string());
    human.push_summary("Tasks file", resolver.tasks_file_path().display().to_string());
}
