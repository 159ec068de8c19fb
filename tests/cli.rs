// tests/cli.rs

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn taskdag(dir: &TempDir) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("taskdag");
    cmd.current_dir(dir.path());
    cmd.env_remove("TASKDAG_LOG");
    cmd
}

#[test]
fn test_lists_persist_between_invocations_by_default() {
    let dir = tempfile::tempdir().unwrap();

    taskdag(&dir)
        .args(["create", "demo", "--id", "demo"])
        .assert()
        .success();
    taskdag(&dir)
        .args(["add", "demo", "task A", "--id", "A"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"task A\""));
    taskdag(&dir)
        .args(["add", "demo", "task B", "--id", "B"])
        .assert()
        .success();
    taskdag(&dir)
        .args(["deps", "demo", "B", "A"])
        .assert()
        .success();

    taskdag(&dir)
        .arg("lists")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"demo\""));
    taskdag(&dir)
        .args(["ready", "demo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"A\"").and(predicate::str::contains("\"B\"").not()));

    assert!(dir.path().join(".taskdag").join("demo.json").exists());
}

#[test]
fn test_show_reports_list_aggregates() {
    let dir = tempfile::tempdir().unwrap();
    taskdag(&dir).args(["create", "demo", "--id", "demo"]).assert().success();
    taskdag(&dir).args(["add", "demo", "only", "--id", "A"]).assert().success();

    taskdag(&dir)
        .args(["show", "demo"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"totalItems\": 1")
                .and(predicate::str::contains("\"completedItems\": 0"))
                .and(predicate::str::contains("\"progress\"")),
        );
}

#[test]
fn test_unknown_list_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    taskdag(&dir)
        .args(["ready", "nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope"));
}
