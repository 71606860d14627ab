//! Tests for the validate command.

use crate::support::*;

#[test]
fn test_validate_ok() {
    let t = Test::with_config(
        r#"
repos:
  - owner: acme
    name: api
    secrets:
      FOO: bar
      TOKEN: { fromEnv: SECRETSYNC_CLI_TEST_TOKEN }
orgs:
  - name: acme
    secrets:
      SHARED: { value: x, visibility: selected, repositories: [api] }
"#,
    );

    let output = t
        .cmd()
        .arg("validate")
        .env("SECRETSYNC_CLI_TEST_TOKEN", "value")
        .output()
        .unwrap();

    assert_success(&output);
    assert_stdout_contains(&output, "configuration is valid (2 target(s))");
}

#[test]
fn test_validate_reports_problems() {
    let t = Test::with_config(
        r#"
repos:
  - owner: acme
    name: api
    secrets:
      TOKEN: { fromEnv: SECRETSYNC_CLI_TEST_UNSET }
      GITHUB_TOKEN: x
"#,
    );

    let output = t
        .cmd()
        .arg("validate")
        .env_remove("SECRETSYNC_CLI_TEST_UNSET")
        .output()
        .unwrap();

    assert_failure(&output);
    assert_stderr_contains(&output, "SECRETSYNC_CLI_TEST_UNSET");
    assert_stderr_contains(&output, "GITHUB_TOKEN");
    assert_stderr_contains(&output, "2 secret declaration(s) are invalid");
}

#[test]
fn test_validate_multiple_files() {
    let t = Test::new();
    t.write("repos.yml", "repos:\n  - owner: acme\n    name: api\n    secrets: { A: '1' }\n");
    t.write("orgs.yml", "orgs:\n  - name: acme\n    secrets: { B: '2' }\n");

    let output = t
        .cmd()
        .args(["validate", "-f", "repos.yml", "--file", "orgs.yml"])
        .output()
        .unwrap();

    assert_success(&output);
    assert_stdout_contains(&output, "2 target(s)");
}
