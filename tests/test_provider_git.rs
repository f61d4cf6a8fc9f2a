mod common;

use devcall::exceptions::DevcallError;
use serde_json::json;
use std::fs;
use tempfile::tempdir;

#[test]
fn status_add_commit_log_flow() {
    let temp = tempdir().unwrap();
    common::init_git_repo(temp.path());
    let registry = common::bundled_registry();

    // GIVEN an untracked file in a repository with no commits yet
    fs::write(temp.path().join("a.txt"), "one\n").unwrap();
    let status =
        common::call(&registry, "git.status", json!({}), temp.path()).unwrap();
    assert_eq!(status["branch"], json!("main"));
    assert_eq!(status["clean"], json!(false));
    assert_eq!(
        status["changes"],
        json!([{ "status": "??", "path": "a.txt" }])
    );

    // WHEN staging and committing it
    common::call(
        &registry,
        "git.add",
        json!({ "paths": ["a.txt"] }),
        temp.path(),
    )
    .unwrap();
    let commit = common::call(
        &registry,
        "git.commit",
        json!({ "message": "add a.txt" }),
        temp.path(),
    )
    .unwrap();
    assert_eq!(commit["success"], json!(true));

    // THEN the tree is clean on main and the log shows the commit
    let status =
        common::call(&registry, "git.status", json!({}), temp.path()).unwrap();
    assert_eq!(status["branch"], json!("main"));
    assert_eq!(status["clean"], json!(true));

    let log = common::call(&registry, "git.log", json!({ "limit": 5 }), temp.path()).unwrap();
    let commits = log["commits"].as_array().unwrap();
    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0]["subject"], json!("add a.txt"));
    assert_eq!(commits[0]["sha"].as_str().unwrap().len(), 40);
}

#[test]
fn add_requires_paths() {
    let temp = tempdir().unwrap();
    common::init_git_repo(temp.path());
    let registry = common::bundled_registry();

    let err = common::call(
        &registry,
        "git.add",
        json!({ "paths": [] }),
        temp.path(),
    )
    .unwrap_err();
    assert!(matches!(err, DevcallError::InvalidInput(_)));
}

#[test]
fn status_outside_a_repository_fails() {
    let temp = tempdir().unwrap();
    let registry = common::bundled_registry();

    let err = common::call(&registry, "git.status", json!({}), temp.path()).unwrap_err();
    assert!(matches!(err, DevcallError::Exec(_)));
}
