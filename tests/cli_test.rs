//! Integration tests for the orgflow binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_project(config: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("orgflow.yml"), config).unwrap();
    temp
}

fn orgflow(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("orgflow"));
    cmd.current_dir(temp.path())
        .env("HOME", temp.path())
        .env("NO_COLOR", "1")
        .env_remove("ORGFLOW_ORG")
        .env_remove("RUST_LOG");
    cmd
}

const RELEASE_CONFIG: &str = r#"
project:
  name: demo
default_org: dev
orgs:
  dev: { scratch: true, alias: dev-org }
  prod: { scratch: false, alias: prod-org }
tasks:
  version:
    class_path: orgflow.tasks.Emit
    options: { number: "1.0" }
  announce:
    class_path: orgflow.tasks.Log
    options: { message: ^^version.number }
  scratch_only:
    class_path: orgflow.tasks.Log
    options: { message: $org.alias }
  broken:
    class_path: orgflow.tasks.Command
    options: { command: "exit 3" }
flows:
  release:
    description: Cut a release
    steps:
      1: { task: version }
      2: { task: announce }
      3: { task: scratch_only, when: org.scratch }
  tolerant:
    steps:
      1: { task: broken, ignore_failure: true }
      2: { task: version }
  strict:
    steps:
      1: { task: broken }
      2: { task: version }
"#;

fn release_project() -> TempDir {
    setup_project(RELEASE_CONFIG)
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("orgflow"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Declarative task and flow"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("orgflow"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_requires_subcommand() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("orgflow"));
    cmd.assert().failure();
    Ok(())
}

#[test]
fn cli_missing_config_exits_with_two() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    orgflow(&temp)
        .args(["plan", "release"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No configuration found"));
    Ok(())
}

#[test]
fn cli_plan_prints_expanded_steps() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    orgflow(&temp)
        .args(["plan", "release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("release · 3 steps"))
        .stdout(predicate::str::contains("when org.scratch"));
    Ok(())
}

#[test]
fn cli_plan_json_applies_overrides() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    let output = orgflow(&temp)
        .args(["plan", "release", "--json", "-o", "version__number=2.0"])
        .output()?;

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["steps"][0]["options"]["number"], 2.0);
    Ok(())
}

#[test]
fn cli_run_succeeds() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    orgflow(&temp)
        .args(["run", "release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("release succeeded"));
    Ok(())
}

#[test]
fn cli_run_json_carries_outputs() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    let output = orgflow(&temp)
        .args(["run", "release", "--json", "--org", "prod"])
        .output()?;

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["status"], "succeeded");
    assert_eq!(json["steps"][1]["outputs"]["message"], "1.0");
    assert_eq!(json["steps"][2]["status"], "skipped");
    Ok(())
}

#[test]
fn cli_run_org_from_env() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    let output = orgflow(&temp)
        .env("ORGFLOW_ORG", "prod")
        .args(["run", "release", "--json"])
        .output()?;

    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["steps"][2]["status"], "skipped");
    Ok(())
}

#[test]
fn cli_run_tolerated_failure_exits_with_one() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    orgflow(&temp)
        .args(["run", "tolerant"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("tolerant completed with errors"));
    Ok(())
}

#[test]
fn cli_run_strict_failure_aborts() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    orgflow(&temp)
        .args(["run", "strict"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("strict aborted"));
    Ok(())
}

#[test]
fn cli_run_skip_unknown_name_warns() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    orgflow(&temp)
        .args(["run", "release", "--skip", "nothing"])
        .assert()
        .success()
        .stderr(predicate::str::contains("matches no step"));
    Ok(())
}

#[test]
fn cli_task_runs_single_task() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    let output = orgflow(&temp)
        .args(["task", "announce", "--json", "-o", "message=$project.name"])
        .output()?;

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json["outputs"]["message"], "demo");
    Ok(())
}

#[test]
fn cli_list_shows_tasks_and_flows() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    orgflow(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("announce"))
        .stdout(predicate::str::contains("release: version → announce → scratch_only"));
    Ok(())
}

#[test]
fn cli_lint_clean_project() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    orgflow(&temp)
        .arg("lint")
        .assert()
        .success()
        .stdout(predicate::str::contains("are valid"));
    Ok(())
}

#[test]
fn cli_lint_reports_problems() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        "tasks:\n  a: { class_path: acme.Missing }\nflows:\n  f:\n    steps:\n      1: { task: ghost }\n",
    );
    orgflow(&temp)
        .arg("lint")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[unknown-task]"))
        .stderr(predicate::str::contains("[unknown-implementation]"));
    Ok(())
}

#[test]
fn cli_local_override_disables_step() -> Result<(), Box<dyn std::error::Error>> {
    let temp = release_project();
    fs::write(
        temp.path().join("orgflow.local.yml"),
        "flows:\n  release:\n    steps:\n      3: { task: None }\n",
    )?;
    orgflow(&temp)
        .args(["plan", "release"])
        .assert()
        .success()
        .stdout(predicate::str::contains("release · 2 steps"));
    Ok(())
}

#[test]
fn cli_completions_bash() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("orgflow"));
    cmd.args(["completions", "bash"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("orgflow"));
    Ok(())
}
