mod support;

use support::{parse_json, TestEnv};

#[test]
fn json_error_envelope_for_missing_task() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new()?;

    let output = env.lina().args(["--json", "delete", "ghost"]).output()?;
    assert_eq!(output.status.code(), Some(3));

    let value = parse_json(&output.stdout)?;
    assert_eq!(value["schema_version"], "lina.v1");
    assert_eq!(value["command"], "delete");
    assert_eq!(value["status"], "error");
    assert_eq!(value["kind"], "not_found");
    assert_eq!(value["hint"], "lina list -a");
    assert_eq!(value["error"]["code"], 3);
    assert_eq!(value["error"]["details"]["id"], "ghost");
    assert!(value["error"]["error"]
        .as_str()
        .is_some_and(|message| message.contains("ghost")));
    Ok(())
}

#[test]
fn json_error_envelope_outside_project() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new()?;

    let output = env.lina().args(["--json", "add", "Nowhere"]).output()?;
    assert_eq!(output.status.code(), Some(2));

    let value = parse_json(&output.stdout)?;
    assert_eq!(value["command"], "add");
    assert_eq!(value["kind"], "user_error");
    Ok(())
}

#[test]
fn unwritable_storage_is_operation_failure() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new()?;
    let blocker = env.path().join("blocker");
    std::fs::write(&blocker, "a file, not a directory")?;
    let storage = blocker.join("nested").display().to_string();

    env.lina()
        .args(["config", "set", "storage", &storage])
        .assert()
        .success();

    env.lina().args(["add", "Lost", "-g"]).assert().code(4);
    Ok(())
}

#[test]
fn json_error_names_command_after_home_flag() -> Result<(), Box<dyn std::error::Error>> {
    let env = TestEnv::new()?;
    let home = env.app_dir().display().to_string();

    let output = env
        .lina()
        .args(["--home", &home, "--json", "complete", "ghost"])
        .output()?;
    assert_eq!(output.status.code(), Some(3));

    let value = parse_json(&output.stdout)?;
    assert_eq!(value["command"], "complete");
    Ok(())
}
