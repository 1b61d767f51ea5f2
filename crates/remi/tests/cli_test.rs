//! Integration tests for the `remi` CLI binary.
//!
//! Argument parsing, help, completions and error paths run with an
//! empty config; the device commands run against a wiremock Parse
//! server through a temporary profile.
#![allow(clippy::unwrap_used)]

use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `remi` binary with env isolation.
///
/// Clears all `REMI_*` env vars and points the config file into
/// `dir` so tests never touch the user's real configuration.
fn remi_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("remi");
    cmd.env("REMI_CONFIG", dir.join("config.toml"))
        .env("HOME", dir)
        .env("XDG_CONFIG_HOME", dir)
        .env_remove("REMI_PROFILE")
        .env_remove("REMI_OUTPUT")
        .env_remove("REMI_TIMEOUT")
        .env_remove("REMI_USERNAME")
        .env_remove("REMI_PASSWORD")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Write a `home` profile bound to `remi_1` on the mock server.
fn write_profile(dir: &Path, server: &MockServer) -> PathBuf {
    let path = dir.join("config.toml");
    let toml = format!(
        r#"default_profile = "home"

[profiles.home]
username = "test@example.com"
remi_id = "remi_1"
installation_id = "install-1"
session_token = "persisted_token"
base_url = "{}/parse"
"#,
        server.uri()
    );
    std::fs::write(&path, toml).unwrap();
    path
}

/// A command against the mock server; the password comes from the env
/// so the keyring is never consulted.
fn device_cmd(dir: &Path) -> assert_cmd::Command {
    let mut cmd = remi_cmd(dir);
    cmd.env("REMI_PASSWORD", "test_password");
    cmd
}

async fn mount_device(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/parse/classes/Remi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [{
            "objectId": "remi_1",
            "name": "Bedroom",
            "temp": 157,
            "volume": 40,
            "current_firmware_version": 100,
        }]})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/parse/classes/Event"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [
            { "objectId": "a1", "name": "School", "enabled": true },
            { "objectId": "a2", "name": "Weekend", "enabled": false },
        ]})))
        .mount(server)
        .await;
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let dir = TempDir::new().unwrap();
    let output = remi_cmd(dir.path()).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let dir = TempDir::new().unwrap();
    remi_cmd(dir.path()).arg("--help").assert().success().stdout(
        predicate::str::contains("Remi")
            .and(predicate::str::contains("alarms"))
            .and(predicate::str::contains("login"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    let dir = TempDir::new().unwrap();
    remi_cmd(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("remi"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_zsh() {
    let dir = TempDir::new().unwrap();
    remi_cmd(dir.path())
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_bash() {
    let dir = TempDir::new().unwrap();
    remi_cmd(dir.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let dir = TempDir::new().unwrap();
    let output = remi_cmd(dir.path()).arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_status_without_profile() {
    let dir = TempDir::new().unwrap();
    remi_cmd(dir.path())
        .arg("status")
        .assert()
        .code(4)
        .stderr(predicate::str::contains("profile"));
}

#[test]
fn test_invalid_output_format() {
    let dir = TempDir::new().unwrap();
    let output = remi_cmd(dir.path())
        .args(["--output", "invalid", "status"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about output format:\n{text}"
    );
}

#[test]
fn test_volume_out_of_range_is_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    remi_cmd(dir.path())
        .args(["set", "volume", "101"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("101"));
}

#[test]
fn test_repeat_day_out_of_range() {
    let dir = TempDir::new().unwrap();
    remi_cmd(dir.path())
        .args([
            "alarms", "create", "--name", "Wake", "--time", "07:00", "--repeat", "7",
        ])
        .assert()
        .code(2);
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_no_config() {
    // `config show` falls back to defaults when no file exists.
    let dir = TempDir::new().unwrap();
    remi_cmd(dir.path()).args(["config", "show"]).assert().success();
}

#[test]
fn test_config_path_honours_env() {
    let dir = TempDir::new().unwrap();
    remi_cmd(dir.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_show_masks_session_token() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_profile(dir.path(), &server);

    remi_cmd(dir.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[profiles.home]")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("persisted_token").not()),
        );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_config_use_unknown_profile() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    write_profile(dir.path(), &server);

    remi_cmd(dir.path())
        .args(["config", "use", "cabin"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("home"));
}

// ── Device commands against a mock server ───────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_status_json() {
    let server = MockServer::start().await;
    mount_device(&server).await;
    let dir = TempDir::new().unwrap();
    write_profile(dir.path(), &server);

    let output = device_cmd(dir.path())
        .args(["-o", "json", "status"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let view: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(view["device"]["name"], "Bedroom");
    assert!(view["entities"].as_array().is_some_and(|e| !e.is_empty()));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_alarms_list_plain() {
    let server = MockServer::start().await;
    mount_device(&server).await;
    let dir = TempDir::new().unwrap();
    write_profile(dir.path(), &server);

    device_cmd(dir.path())
        .args(["-o", "plain", "alarms", "list"])
        .assert()
        .success()
        .stdout("a1\na2\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_alarms_get_unknown_id() {
    let server = MockServer::start().await;
    mount_device(&server).await;
    let dir = TempDir::new().unwrap();
    write_profile(dir.path(), &server);

    device_cmd(dir.path())
        .args(["alarms", "get", "zz"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("zz"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_set_volume_writes_device() {
    let server = MockServer::start().await;
    mount_device(&server).await;
    Mock::given(method("PUT"))
        .and(path("/parse/classes/Remi/remi_1"))
        .and(body_json(json!({ "volume": 30 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    write_profile(dir.path(), &server);

    device_cmd(dir.path())
        .args(["set", "volume", "30"])
        .assert()
        .success();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_delete_requires_yes_without_terminal() {
    let server = MockServer::start().await;
    mount_device(&server).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();
    write_profile(dir.path(), &server);

    device_cmd(dir.path())
        .args(["alarms", "delete", "a1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}
