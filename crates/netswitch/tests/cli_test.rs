//! Integration tests for the `netswitch` binary.
//!
//! These tests validate argument parsing, help output, config handling,
//! and error exit codes without touching the kernel or a telemetry backend.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `netswitch` binary with env isolation.
///
/// Clears all `NETSWITCH_*` flag env vars and points config directories at
/// a nonexistent path so tests never touch the user's real configuration.
fn netswitch_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("netswitch");
    cmd.env("HOME", "/tmp/netswitch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/netswitch-cli-test-nonexistent")
        .env_remove("NETSWITCH_CONFIG")
        .env_remove("NETSWITCH_LOCAL_ID")
        .env_remove("NETSWITCH_TELEMETRY_URL")
        .env_remove("NETSWITCH_INTERVAL")
        .env_remove("NETSWITCH_TIMEOUT")
        .env_remove("NETSWITCH_OUTPUT")
        .env_remove("RUST_LOG");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = netswitch_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_lists_subcommands() {
    netswitch_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("run")
            .and(predicate::str::contains("once"))
            .and(predicate::str::contains("inspect"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    netswitch_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("netswitch"));
}

#[test]
fn test_unknown_output_format_is_usage_error() {
    netswitch_cmd()
        .args(["-o", "yaml", "config", "show"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid value"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_init_then_show() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let path_str = path.to_str().unwrap();

    netswitch_cmd()
        .args(["--config", path_str, "config", "init"])
        .assert()
        .success();
    assert!(path.exists());

    netswitch_cmd()
        .args(["--config", path_str, "config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("[switch]")
                .and(predicate::str::contains("telemetry_url"))
                .and(predicate::str::contains("http://127.0.0.1:8428")),
        );
}

#[test]
fn test_config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[switch]\nlocal_id = 1\n").unwrap();

    netswitch_cmd()
        .args(["--config", path.to_str().unwrap(), "config", "init"])
        .assert()
        .code(6)
        .stderr(predicate::str::contains("already exists"));

    netswitch_cmd()
        .args(["--config", path.to_str().unwrap(), "config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_show_masks_token_and_applies_flags() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        "[switch]\nlocal_id = 1\ntelemetry_token = \"hunter2\"\n",
    )
    .unwrap();

    netswitch_cmd()
        .args([
            "--config",
            path.to_str().unwrap(),
            "--interval",
            "30",
            "-o",
            "json",
            "config",
            "show",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("\"interval_secs\": 30")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not()),
        );
}

#[test]
fn test_invalid_config_value_is_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[switch]\nlocal_id = 1\n").unwrap();

    netswitch_cmd()
        .args([
            "--config",
            path.to_str().unwrap(),
            "--telemetry-url",
            "not a url",
            "inspect",
            "2",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("telemetry_url"));
}

#[test]
fn test_inspect_rejects_bad_remote_id() {
    netswitch_cmd()
        .args(["--local-id", "1", "inspect", "peer-b"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("peer-b"));
}
