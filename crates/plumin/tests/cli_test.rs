#![allow(deprecated)] // TODO: move from cargo_bin to cargo_bin_cmd!

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

fn plumin(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("plumin").unwrap();
    cmd.current_dir(dir)
        .env_remove("PLUMIN_STACK")
        .env_remove("PLUMIN_CONFIG_PATH")
        .env_remove("RUST_LOG")
        .env("NO_COLOR", "1")
        .env("CLICOLOR", "0");
    cmd
}

fn project_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("plumin.yaml"),
        "name: create-vpc\nstack: dev\n",
    )
    .unwrap();
    dir
}

#[test]
fn test_cli_help() {
    let dir = project_dir();
    plumin(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("preview"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("destroy"))
        .stdout(predicate::str::contains("output"));
}

#[test]
fn test_cli_version() {
    let dir = project_dir();
    plumin(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("plumin"));
}

#[test]
fn test_invalid_command() {
    let dir = project_dir();
    plumin(dir.path()).arg("invalid-command").assert().failure();
}

#[test]
fn test_preview_does_not_create() {
    let dir = project_dir();
    plumin(dir.path())
        .arg("preview")
        .assert()
        .success()
        .stdout(predicate::str::contains("on Local simulated cloud"))
        .stdout(predicate::str::contains("my-vpc"))
        .stdout(predicate::str::contains("1 to create"))
        .stdout(predicate::str::contains("vpc_id: [unknown]"));

    assert!(!dir.path().join(".plumin/dev/state.json").exists());
    assert!(!dir.path().join(".plumin/dev/local-cloud.json").exists());
}

#[test]
fn test_up_then_output() {
    let dir = project_dir();
    plumin(dir.path())
        .arg("up")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 to create"))
        .stdout(predicate::str::contains("vpc_id: vpc-00000001"));

    assert!(dir.path().join(".plumin/dev/state.json").exists());

    plumin(dir.path())
        .args(["output", "vpc_id"])
        .assert()
        .success()
        .stdout(predicate::str::diff("vpc-00000001\n"));

    plumin(dir.path())
        .args(["output", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""vpc_id": "vpc-00000001""#));

    plumin(dir.path())
        .args(["output", "subnet_id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("subnet_id"));
}

#[test]
fn test_second_up_changes_nothing() {
    let dir = project_dir();
    plumin(dir.path()).arg("up").assert().success();

    plumin(dir.path())
        .arg("up")
        .assert()
        .success()
        .stdout(predicate::str::contains("0 to create"))
        .stdout(predicate::str::contains("1 unchanged"))
        .stdout(predicate::str::contains("vpc_id: vpc-00000001"));

    plumin(dir.path())
        .arg("preview")
        .assert()
        .success()
        .stdout(predicate::str::contains("No changes"));
}

#[test]
fn test_destroy_clears_outputs() {
    let dir = project_dir();
    plumin(dir.path()).arg("up").assert().success();

    plumin(dir.path())
        .args(["destroy", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Destroyed 1 resources"));

    plumin(dir.path())
        .arg("output")
        .assert()
        .success()
        .stdout(predicate::str::contains("No outputs"));
}

#[test]
fn test_stacks_are_separate() {
    let dir = project_dir();
    plumin(dir.path()).arg("up").assert().success();

    plumin(dir.path())
        .args(["--stack", "prod", "output"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No outputs"));

    plumin(dir.path())
        .arg("up")
        .env("PLUMIN_STACK", "prod")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 to create"));
}

#[test]
fn test_invalid_project_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("plumin.yaml"), "name: \"\"\n").unwrap();

    plumin(dir.path())
        .arg("preview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("name must not be empty"));
}

#[test]
fn test_stack_must_stay_inside_state_dir() {
    let dir = project_dir();
    let project = dir.path().join("project");
    std::fs::create_dir(&project).unwrap();
    std::fs::write(project.join("plumin.yaml"), "name: create-vpc\n").unwrap();

    plumin(&project)
        .args(["--stack", "../x", "up"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid stack name"));
    assert!(!project.join("x").exists());
    assert!(!project.join(".plumin").exists());

    let outside = dir.path().join("outside");
    plumin(&project)
        .args(["up", "--stack", outside.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid stack name"));
    assert!(!outside.exists());

    plumin(&project)
        .args(["--stack", "", "preview"])
        .assert()
        .failure();
}

#[test]
fn test_version_ignores_project_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("plumin.yaml"), "stack: [unterminated\n").unwrap();

    plumin(dir.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("plumin"));

    plumin(dir.path())
        .arg("preview")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse"));
}
