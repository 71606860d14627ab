//! Tests for error handling and CLI flags.

use crate::support::*;

#[test]
fn test_help() {
    let t = Test::new();

    let output = t.cmd().arg("--help").output().unwrap();
    assert_success(&output);
    let out = stdout(&output);
    assert!(out.contains("secretsync") || out.contains("Usage"));
    assert!(out.contains("sync"));
    assert!(out.contains("validate"));
}

#[test]
fn test_version_flag() {
    let t = Test::new();

    let output = t.cmd().arg("--version").output().unwrap();
    assert_success(&output);
    assert_stdout_contains(&output, env!("CARGO_PKG_VERSION"));
}

#[test]
fn test_unknown_command_fails() {
    let t = Test::new();

    let output = t.cmd().arg("unknown-command").output().unwrap();
    assert_failure(&output);
}

#[test]
fn test_sync_without_token_fails() {
    let t = Test::with_config(
        "repos:\n  - owner: acme\n    name: api\n    secrets: { FOO: bar }\n",
    );

    let output = t.cmd().args(["sync", "--dry-run"]).output().unwrap();

    assert_failure(&output);
    assert_stderr_contains(&output, "no API token");
}

#[test]
fn test_missing_config_file() {
    let t = Test::new();

    let output = t.validate();

    assert_failure(&output);
    assert_stderr_contains(&output, "failed to read secrets.yml");
    assert_stdout_contains(&output, "pass --file");
}

#[test]
fn test_unknown_config_key() {
    let t = Test::with_config("repos:\n  - owner: acme\n    name: api\n    secret: {}\n");

    let output = t.validate();

    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse");
}

#[test]
fn test_invalid_api_url() {
    let t = Test::with_config("repos:\n  - owner: acme\n    name: api\n");

    let output = t.sync("not a url", &["--dry-run"]);

    assert_failure(&output);
    assert_stderr_contains(&output, "invalid API URL");
}

#[test]
fn test_verbose_logs_to_stderr() {
    let t = Test::with_config("repos:\n  - owner: acme\n    name: api\n");

    let output = t.cmd().args(["--verbose", "validate"]).output().unwrap();

    assert_success(&output);
    assert_stderr_contains(&output, "loading config");
}
