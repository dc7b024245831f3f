//! Shared output formatting for lina CLI commands.

use serde::Serialize;

use crate::error::{Error, JsonError, Result};

pub const SCHEMA_VERSION: &str = "lina.v1";

#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct HumanOutput {
    header: String,
    summary: Vec<(String, String)>,
    sections: Vec<(String, Vec<String>)>,
    details: Vec<String>,
    warnings: Vec<String>,
}

impl HumanOutput {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            summary: Vec::new(),
            sections: Vec::new(),
            details: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn push_summary(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.summary.push((key.into(), value.into()));
    }

    /// Titled block of pre-formatted lines, printed as-is.
    pub fn push_section(&mut self, title: impl Into<String>, lines: Vec<String>) {
        self.sections.push((title.into(), lines));
    }

    pub fn push_detail(&mut self, value: impl Into<String>) {
        self.details.push(value.into());
    }

    pub fn push_warning(&mut self, value: impl Into<String>) {
        self.warnings.push(value.into());
    }
}

pub fn emit_success<T: Serialize>(
    options: OutputOptions,
    command: &str,
    data: &T,
    human: Option<&HumanOutput>,
) -> Result<()> {
    if options.json {
        let warnings = human.map(|h| h.warnings.clone()).unwrap_or_default();

        #[derive(Serialize)]
        struct Envelope<'a, T: Serialize> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            data: &'a T,
            #[serde(skip_serializing_if = "Vec::is_empty")]
            warnings: Vec<String>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "success",
            data,
            warnings,
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    if let Some(human) = human {
        // Warnings still reach the user in quiet mode.
        if options.quiet {
            for warning in &human.warnings {
                eprintln!("warning: {warning}");
            }
            return Ok(());
        }
        println!("{}", format_human(human));
    }

    Ok(())
}

pub fn emit_error(command: &str, err: &Error, json: bool) -> Result<()> {
    let hint = error_hint(err);
    if json {
        #[derive(Serialize)]
        struct Envelope<'a> {
            schema_version: &'static str,
            command: &'a str,
            status: &'static str,
            kind: &'static str,
            error: JsonError,
            #[serde(skip_serializing_if = "Option::is_none")]
            hint: Option<&'a str>,
        }

        let payload = Envelope {
            schema_version: SCHEMA_VERSION,
            command,
            status: "error",
            kind: error_kind(err),
            error: JsonError::from(err),
            hint: hint.as_deref(),
        };

        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    eprintln!("error: {err}");
    if let Some(hint) = hint {
        eprintln!("hint: {hint}");
    }
    Ok(())
}

pub fn format_human(output: &HumanOutput) -> String {
    let mut lines = Vec::new();
    lines.push(output.header.clone());

    for (title, items) in &output.sections {
        lines.push(String::new());
        lines.push(format!("=== {title} ==="));
        lines.push(String::new());
        lines.extend(items.iter().cloned());
    }

    push_summary(&mut lines, &output.summary);
    push_list(&mut lines, "Details", &output.details);
    push_list(&mut lines, "Warnings", &output.warnings);

    lines.join("\n")
}

pub fn infer_command_name_from_args() -> String {
    command_name_from(std::env::args().skip(1))
}

/// Global flags whose value is a separate argument.
const VALUE_FLAGS: [&str; 2] = ["--home", "--repo"];

fn command_name_from(args: impl IntoIterator<Item = String>) -> String {
    let mut positionals = Vec::new();
    let mut skip_value = false;
    for arg in args {
        if skip_value {
            skip_value = false;
            continue;
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_value = true;
            continue;
        }
        if arg.starts_with('-') {
            continue;
        }
        positionals.push(arg);
        if positionals.len() == 2 {
            break;
        }
    }

    let mut positionals = positionals.into_iter();
    let command = match positionals.next() {
        Some(cmd) => cmd,
        None => return "lina".to_string(),
    };

    match positionals.next() {
        Some(sub) if command == "config" => format!("{command} {sub}"),
        _ => command,
    }
}

fn error_kind(err: &Error) -> &'static str {
    match err.exit_code() {
        2 => "user_error",
        3 => "not_found",
        _ => "operation_failed",
    }
}

fn error_hint(err: &Error) -> Option<String> {
    match err {
        Error::TaskNotFound(_) => Some("lina list -a".to_string()),
        Error::NotInProject => Some("lina add \"<title>\" -g".to_string()),
        Error::UnknownConfigKey(_) => Some("lina config set storage <path>".to_string()),
        Error::InvalidConfig(_) | Error::CorruptStorage(_) => Some("lina config".to_string()),
        _ => None,
    }
}

fn push_summary(lines: &mut Vec<String>, summary: &[(String, String)]) {
    if summary.is_empty() {
        return;
    }

    lines.push(String::new());
    for (key, value) in summary {
        if value.is_empty() {
            lines.push(format!("  {key}"));
        } else {
            lines.push(format!("  {key}: {value}"));
        }
    }
}

fn push_list(lines: &mut Vec<String>, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }

    lines.push(String::new());
    lines.push(format!("{title}:"));
    for item in items {
        lines.push(format!("- {item}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_output_orders_sections_before_summary() {
        let mut output = HumanOutput::new("Tasks: all tasks");
        output.push_section("Pending Tasks", vec!["○ Buy milk (general)".to_string()]);
        output.push_summary("Total", "1 tasks (1 pending, 0 completed)");
        output.push_warning("task file is corrupt");

        let text = format_human(&output);
        let pending = text.find("=== Pending Tasks ===").expect("section");
        let total = text.find("Total: 1 tasks").expect("summary");
        assert!(pending < total);
        assert!(text.contains("Warnings:\n- task file is corrupt"));
    }

    #[test]
    fn command_name_skips_global_flag_values() {
        let name = |args: &[&str]| command_name_from(args.iter().map(|arg| arg.to_string()));

        assert_eq!(name(&["--home", "/tmp/x", "add", "Ship"]), "add");
        assert_eq!(name(&["--json", "--repo", "/src/acme", "list"]), "list");
        assert_eq!(name(&["config", "--home", "/tmp/x", "set", "storage", "~/t"]), "config set");
        assert_eq!(name(&["--home=/tmp/x", "delete", "id"]), "delete");
        assert_eq!(name(&["--home", "/tmp/x"]), "lina");
    }

    #[test]
    fn error_kind_follows_exit_code() {
        assert_eq!(error_kind(&Error::NotInProject), "user_error");
        assert_eq!(error_kind(&Error::TaskNotFound("x".into())), "not_found");
        assert_eq!(
            error_kind(&Error::OperationFailed("disk".into())),
            "operation_failed"
        );
    }
}
