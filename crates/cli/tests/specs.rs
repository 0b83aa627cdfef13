// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end scenarios driving the `automaker` binary as a subprocess
//! against a scratch project directory. None of these spawn a real
//! coding-agent process: each either never reaches the transport, or
//! points `--agent-binary` at something that can't be found on `PATH`,
//! so the scenarios stay fast and hermetic.

use assert_cmd::Command;
use serde_json::json;
use std::path::Path;
use tempfile::tempdir;

fn automaker() -> Command {
    Command::cargo_bin("automaker").expect("automaker binary builds")
}

fn stdout_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stdout).into_owned()
}

fn stderr_of(assert: &assert_cmd::assert::Assert) -> String {
    String::from_utf8_lossy(&assert.get_output().stderr).into_owned()
}

fn write_feature_list(project: &Path, features: serde_json::Value) {
    let dir = project.join(".automaker");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("feature_list.json"), serde_json::to_vec_pretty(&features).unwrap()).unwrap();
}

fn backlog_feature(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "category": "Core",
        "description": "add a thing",
        "status": "backlog",
        "model": "claude-sonnet-4-5",
        "priority": 1,
        "dependencies": [],
    })
}

#[test]
fn status_on_an_empty_project_reports_idle() {
    let project = tempdir().unwrap();

    let assert = automaker()
        .args(["--project", project.path().to_str().unwrap(), "status", "--format", "json"])
        .assert()
        .success();
    let stdout = stdout_of(&assert);
    assert!(stdout.contains("\"max_concurrency\": 1"), "stdout was: {stdout}");
    assert!(stdout.contains("\"running\": []"), "stdout was: {stdout}");
}

#[test]
fn reconcile_on_an_empty_project_resets_nothing() {
    let project = tempdir().unwrap();
    write_feature_list(project.path(), json!([]));

    let assert =
        automaker().args(["--project", project.path().to_str().unwrap(), "reconcile"]).assert().success();
    assert!(stdout_of(&assert).contains("reconciled 0 stale feature(s)"));
}

#[test]
fn stopping_an_unknown_feature_is_a_no_op() {
    let project = tempdir().unwrap();

    automaker()
        .args(["--project", project.path().to_str().unwrap(), "stop", "ghost"])
        .assert()
        .success();
}

#[test]
fn running_a_missing_feature_id_exits_with_an_error() {
    let project = tempdir().unwrap();
    write_feature_list(project.path(), json!([]));

    let assert = automaker()
        .args(["--project", project.path().to_str().unwrap(), "run", "missing"])
        .assert()
        .failure()
        .code(1);
    assert!(stderr_of(&assert).contains("error:"));
}

#[test]
fn running_with_an_unresolvable_agent_binary_fails_without_hanging() {
    let project = tempdir().unwrap();
    write_feature_list(project.path(), json!([backlog_feature("f1")]));

    automaker()
        .args([
            "--project",
            project.path().to_str().unwrap(),
            "--agent-binary",
            "automaker-nonexistent-agent-binary",
            "run",
            "f1",
        ])
        .assert()
        .failure()
        .code(1);
}

#[test]
fn reconcile_resets_a_stale_in_progress_feature_to_backlog() {
    let project = tempdir().unwrap();
    let mut stale = backlog_feature("f1");
    stale["status"] = json!("in_progress");
    stale["startedAt"] = json!("2000-01-01T00:00:00.000Z");
    write_feature_list(project.path(), json!([stale]));

    let assert =
        automaker().args(["--project", project.path().to_str().unwrap(), "reconcile"]).assert().success();
    assert!(stdout_of(&assert).contains("reconciled 1 stale feature(s)"));

    let raw = std::fs::read_to_string(project.path().join(".automaker").join("feature_list.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(saved[0]["status"], json!("backlog"));
}
