mod common;

use devcall::exceptions::DevcallError;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

#[test]
fn exec_captures_stdout() {
    let temp = tempdir().unwrap();
    let registry = common::bundled_registry();

    let result = common::call(
        &registry,
        "shell.exec",
        json!({ "command": "echo hello world" }),
        temp.path(),
    )
    .unwrap();

    assert_eq!(result["success"], json!(true));
    assert_eq!(result["status"], json!(0));
    assert_eq!(result["stdout"].as_str().unwrap().trim(), "hello world");
}

#[test]
fn exec_resolves_relative_cwd() {
    let temp = tempdir().unwrap();
    let sub = temp.path().join("sub");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("marker.txt"), "x").unwrap();
    let registry = common::bundled_registry();

    // GIVEN a cwd relative to the call root
    let result = common::call(
        &registry,
        "shell.exec",
        json!({ "command": "ls", "cwd": "sub" }),
        temp.path(),
    )
    .unwrap();

    // THEN the command ran inside it
    assert!(result["stdout"].as_str().unwrap().contains("marker.txt"));
}

#[test]
fn exec_passes_environment() {
    let temp = tempdir().unwrap();
    let registry = common::bundled_registry();

    let result = common::call(
        &registry,
        "shell.exec",
        json!({
            "command": "sh -c 'echo $DEVCALL_TEST_VAR'",
            "env": { "DEVCALL_TEST_VAR": "plumbed" },
        }),
        temp.path(),
    )
    .unwrap();

    assert_eq!(result["stdout"].as_str().unwrap().trim(), "plumbed");
}

#[test]
fn exec_rejects_nonzero_exit_by_default() {
    let temp = tempdir().unwrap();
    let registry = common::bundled_registry();

    let err = common::call(
        &registry,
        "shell.exec",
        json!({ "command": "sh -c 'exit 5'" }),
        temp.path(),
    )
    .unwrap_err();
    assert!(matches!(err, DevcallError::Exec(_)));

    // WHEN failure is allowed, the output comes back instead
    let result = common::call(
        &registry,
        "shell.exec",
        json!({ "command": "sh -c 'exit 5'", "allow_failure": true }),
        temp.path(),
    )
    .unwrap();
    assert_eq!(result["status"], json!(5));
    assert_eq!(result["success"], json!(false));
}

#[test]
fn exec_rejects_unparsable_command_lines() {
    let temp = tempdir().unwrap();
    let registry = common::bundled_registry();

    let err = common::call(
        &registry,
        "shell.exec",
        json!({ "command": "echo 'unclosed" }),
        temp.path(),
    )
    .unwrap_err();
    assert!(matches!(err, DevcallError::InvalidInput(_)));

    let err = common::call(
        &registry,
        "shell.exec",
        json!({ "command": "   " }),
        temp.path(),
    )
    .unwrap_err();
    assert!(matches!(err, DevcallError::InvalidInput(_)));
}
