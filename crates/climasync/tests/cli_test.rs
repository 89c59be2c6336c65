//! Integration tests for the `climasync` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! config handling and error exit codes, all without a live Mautic.
#![allow(clippy::unwrap_used)]

use std::io::Write;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `climasync` binary with env isolation.
///
/// Clears all `CLIMASYNC_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn climasync_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("climasync");
    cmd.env("HOME", "/tmp/climasync-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/climasync-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("CLIMASYNC_PROFILE")
        .env_remove("CLIMASYNC_CONFIG")
        .env_remove("CLIMASYNC_URL")
        .env_remove("CLIMASYNC_OUTPUT")
        .env_remove("CLIMASYNC_INSECURE")
        .env_remove("CLIMASYNC_TIMEOUT")
        .env_remove("CLIMASYNC_USERNAME")
        .env_remove("CLIMASYNC_PASSWORD");
    cmd
}

fn write_config(dir: &tempfile::TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
}

const TWO_PROFILES: &str = r#"
default_profile = "local"

[profiles.local]
url = "http://127.0.0.1:9"
username = "mautic"
password = "hunter2"

[profiles.staging]
url = "https://mautic.staging.test"
username = "api"
password_env = "CLIMASYNC_TEST_STAGING_PW"
"#;

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = climasync_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    climasync_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("contacts")
            .and(predicate::str::contains("segments"))
            .and(predicate::str::contains("campaigns"))
            .and(predicate::str::contains("bulletin")),
    );
}

#[test]
fn test_version_flag() {
    climasync_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("climasync"));
}

#[test]
fn test_invalid_subcommand() {
    climasync_cmd().arg("frobnicate").assert().code(2);
}

#[test]
fn test_invalid_output_format() {
    climasync_cmd()
        .args(["--output", "xml", "contacts", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("xml"));
}

#[test]
fn test_send_requires_template_id() {
    climasync_cmd()
        .args(["send", "email"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--template-id"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    climasync_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("climasync"));
}

#[test]
fn test_completions_zsh() {
    climasync_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_show_redacts_passwords() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, TWO_PROFILES);

    climasync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("http://127.0.0.1:9")
                .and(predicate::str::contains("****"))
                .and(predicate::str::contains("hunter2").not())
                .and(predicate::str::contains("Boletin clima")),
        );
}

#[test]
fn test_config_show_without_file_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    climasync_cmd()
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .args(["--output", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"template_prefix\": \"Boletin climatico\""));
}

#[test]
fn test_config_profiles_plain() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, TWO_PROFILES);

    climasync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--output", "plain", "config", "profiles"])
        .assert()
        .success()
        .stdout("local\nstaging\n");
}

#[test]
fn test_config_use_switches_default_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, TWO_PROFILES);

    climasync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "use", "staging"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(
        saved.contains("default_profile = \"staging\""),
        "unexpected config:\n{saved}"
    );
}

#[test]
fn test_config_use_unknown_profile() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, TWO_PROFILES);

    climasync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["config", "use", "prod"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("prod").and(predicate::str::contains("staging")));
}

// ── Connection-bound commands ───────────────────────────────────────

#[test]
fn test_contacts_list_without_config() {
    let dir = tempfile::tempdir().unwrap();
    let output = climasync_cmd()
        .arg("--config")
        .arg(dir.path().join("missing.toml"))
        .args(["contacts", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("config init"), "Expected setup hint:\n{text}");
}

#[test]
fn test_unknown_profile_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, TWO_PROFILES);

    climasync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--profile", "prod", "segments", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("prod"));
}

#[test]
fn test_invalid_url_flag() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, TWO_PROFILES);

    climasync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--profile", "staging", "--url", "not a url", "emails", "list"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("url"));
}

#[test]
fn test_unreadable_users_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, TWO_PROFILES);

    climasync_cmd()
        .arg("--config")
        .arg(&path)
        .env("CLIMASYNC_TEST_STAGING_PW", "pw")
        .args(["--profile", "staging", "contacts", "import", "--users-file"])
        .arg(dir.path().join("nope.json"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("nope.json"));
}

#[test]
fn test_send_without_yes_is_refused_non_interactively() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(&dir, TWO_PROFILES);

    climasync_cmd()
        .arg("--config")
        .arg(&path)
        .env("CLIMASYNC_TEST_STAGING_PW", "pw")
        .args(["--profile", "staging", "send", "sms", "--template-id", "4"])
        .write_stdin("")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_campaigns_trigger_reports_console_failures() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(
        &dir,
        r#"
[console]
program = "/nonexistent/climasync-console"
args = []
max_attempts = 2
delay_secs = 0
"#,
    );

    climasync_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--output", "plain", "campaigns", "trigger"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("attempts=2")
                .and(predicate::str::contains("drained=0"))
                .and(predicate::str::contains("failures=4")),
        );
}
