//! CLI integration tests for the edubridge command-line interface.
//!
//! These tests verify:
//! - Help text is displayed correctly
//! - Config discovery, layering and validation through `config` subcommands
//! - `start` fails fast on bad input without binding a port

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the edubridge binary.
fn edubridge() -> Command {
    Command::cargo_bin("edubridge").unwrap()
}

/// A command isolated from the real user config, run from `project`.
fn isolated(user: &TempDir, project: &TempDir) -> Command {
    let mut cmd = edubridge();
    cmd.env("EDUBRIDGE_CONFIG_DIR", user.path())
        .env_remove("EDUBRIDGE_CONFIG")
        .current_dir(project.path());
    cmd
}

// ─────────────────────────────────────────────────────────────────────────────
// Help and Version Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_help_displays() {
    edubridge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("edubridge"))
        .stdout(predicate::str::contains("school portals"));
}

#[test]
fn test_version_displays() {
    edubridge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("edubridge"));
}

#[test]
fn test_help_lists_subcommands() {
    edubridge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_start_help() {
    edubridge()
        .args(["start", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--fixture"));
}

#[test]
fn test_config_subcommands_listed() {
    edubridge()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("which"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("path"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Error Handling Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_subcommand_fails() {
    edubridge()
        .arg("nonexistent-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_invalid_port_fails() {
    edubridge()
        .args(["start", "--port", "not-a-port"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid value"));
}

#[test]
fn test_start_with_missing_fixture_fails() {
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    isolated(&user, &project)
        .args(["start", "--port", "0", "--fixture", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load school data"));
}

#[test]
fn test_start_with_invalid_config_fails() {
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("edubridge.toml"), "[session]\nttl_secs = 0\n").unwrap();

    isolated(&user, &project)
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("session.ttl_secs"));
}

// ─────────────────────────────────────────────────────────────────────────────
// Config Command Tests
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_config_show_defaults() {
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    isolated(&user, &project)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No config files loaded"))
        .stdout(predicate::str::contains("[server]"))
        .stdout(predicate::str::contains("port = 8080"))
        .stdout(predicate::str::contains("ttl_secs = 7200"))
        .stdout(predicate::str::contains("cache_ttl_secs = 100"));
}

#[test]
fn test_config_show_project_overrides_user() {
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(
        user.path().join("config.toml"),
        "[server]\nport = 7000\n\n[timeline]\ncache_capacity = 3\n",
    )
    .unwrap();
    fs::write(project.path().join("edubridge.toml"), "[server]\nport = 9000\n").unwrap();

    isolated(&user, &project)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 9000"))
        .stdout(predicate::str::contains("cache_capacity = 3"))
        .stdout(predicate::str::contains("port = 7000").not());
}

#[test]
fn test_config_show_explicit_file() {
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    let explicit = project.path().join("custom.toml");
    fs::write(&explicit, "[session]\nsliding = true\n").unwrap();

    isolated(&user, &project)
        .args(["config", "show", "--config"])
        .arg(&explicit)
        .assert()
        .success()
        .stdout(predicate::str::contains("sliding = true"))
        .stdout(predicate::str::contains("custom.toml"));
}

#[test]
fn test_config_which_lists_sources() {
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("edubridge.toml"), "[server]\nport = 9000\n").unwrap();

    isolated(&user, &project)
        .args(["config", "which"])
        .assert()
        .success()
        .stdout(predicate::str::contains("not found"))
        .stdout(predicate::str::contains("edubridge.toml"))
        .stdout(predicate::str::contains("1 config file(s) loaded."));
}

#[test]
fn test_config_init_writes_defaults_once() {
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    isolated(&user, &project)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created config file"));

    let written = fs::read_to_string(user.path().join("config.toml")).unwrap();
    assert!(written.contains("[session]"));
    assert!(written.contains("max_sessions = 2000"));

    isolated(&user, &project)
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_init_local() {
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    isolated(&user, &project)
        .args(["config", "init", "--local"])
        .assert()
        .success();

    assert!(project.path().join("edubridge.toml").is_file());
    assert!(!user.path().join("config.toml").exists());
}

#[test]
fn test_config_path_honors_env() {
    let user = TempDir::new().unwrap();
    let project = TempDir::new().unwrap();

    isolated(&user, &project)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"))
        .stdout(predicate::str::contains(
            user.path().display().to_string(),
        ));
}
