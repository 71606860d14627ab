//! Tests for the sync command against a mock API.

use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

use crate::support::*;

const CONFIG: &str = r#"
repos:
  - owner: acme
    name: api
    deleteUnspecified: true
    secrets:
      FOO: bar
"#;

fn first_page() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("per_page".into(), "100".into()),
        Matcher::UrlEncoded("page".into(), "1".into()),
    ])
}

/// Mocks for listing, key and workflow fetches of acme/api.
fn observe(server: &mut ServerGuard, keys: &Keypair, workflow: Option<&str>) -> Vec<Mock> {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine;

    let mut mocks = vec![
        server
            .mock("GET", "/repos/acme/api/actions/secrets")
            .match_query(first_page())
            .with_header("content-type", "application/json")
            .with_body(json!({ "total_count": 1, "secrets": [{ "name": "BAZ" }] }).to_string())
            .create(),
        server
            .mock("GET", "/repos/acme/api/actions/secrets/public-key")
            .with_header("content-type", "application/json")
            .with_body(json!({ "key_id": keys.public.key_id, "key": keys.public.key }).to_string())
            .create(),
    ];

    match workflow {
        None => mocks.push(
            server
                .mock("GET", "/repos/acme/api/contents/.github/workflows")
                .with_status(404)
                .create(),
        ),
        Some(text) => {
            mocks.push(
                server
                    .mock("GET", "/repos/acme/api/contents/.github/workflows")
                    .with_header("content-type", "application/json")
                    .with_body(
                        json!([{
                            "name": "ci.yml",
                            "path": ".github/workflows/ci.yml",
                            "type": "file",
                        }])
                        .to_string(),
                    )
                    .create(),
            );
            mocks.push(
                server
                    .mock("GET", "/repos/acme/api/contents/.github/workflows/ci.yml")
                    .with_header("content-type", "application/json")
                    .with_body(
                        json!({ "content": BASE64.encode(text), "encoding": "base64" })
                            .to_string(),
                    )
                    .create(),
            );
        }
    }

    mocks
}

#[test]
fn test_sync_applies_plan() {
    let mut server = mockito::Server::new();
    let keys = Keypair::generate();
    let _observe = observe(&mut server, &keys, None);
    let put = server
        .mock("PUT", "/repos/acme/api/actions/secrets/FOO")
        .match_body(Matcher::PartialJson(json!({ "key_id": KEY_ID })))
        .with_status(201)
        .expect(1)
        .create();
    let delete = server
        .mock("DELETE", "/repos/acme/api/actions/secrets/BAZ")
        .with_status(204)
        .expect(1)
        .create();
    let t = Test::with_config(CONFIG);

    let output = t.sync(&server.url(), &[]);

    assert_success(&output);
    assert_stdout_contains(&output, "created  FOO");
    assert_stdout_contains(&output, "deleted  BAZ");
    assert_stdout_contains(&output, "2 operation(s) applied");
    put.assert();
    delete.assert();
}

#[test]
fn test_dry_run_sends_no_mutations() {
    let mut server = mockito::Server::new();
    let keys = Keypair::generate();
    let _observe = observe(&mut server, &keys, None);
    let put = server.mock("PUT", Matcher::Any).expect(0).create();
    let delete = server.mock("DELETE", Matcher::Any).expect(0).create();
    let t = Test::with_config(CONFIG);

    let output = t.sync(&server.url(), &["--dry"]);

    assert_success(&output);
    assert_stdout_contains(&output, "created  FOO");
    assert_stdout_contains(&output, "Not applying anything, since this is a dry run.");
    put.assert();
    delete.assert();
}

#[test]
fn test_in_use_deletion_aborts() {
    let mut server = mockito::Server::new();
    let keys = Keypair::generate();
    let _observe = observe(&mut server, &keys, Some("env:\n  B: ${{ secrets.BAZ }}\n"));
    let put = server.mock("PUT", Matcher::Any).expect(0).create();
    let delete = server.mock("DELETE", Matcher::Any).expect(0).create();
    let t = Test::with_config(CONFIG);

    let output = t.sync(&server.url(), &[]);

    assert_failure(&output);
    assert_stdout_contains(&output, "deleted  BAZ (used in 'ci.yml')");
    assert_stderr_contains(&output, "used in workflows are set for deletion");
    put.assert();
    delete.assert();
}

#[test]
fn test_rejected_put_exits_non_zero() {
    let mut server = mockito::Server::new();
    let keys = Keypair::generate();
    let _observe = observe(&mut server, &keys, None);
    let _put = server
        .mock("PUT", "/repos/acme/api/actions/secrets/FOO")
        .with_status(422)
        .with_header("content-type", "application/json")
        .with_body(r#"{"message":"Bad request"}"#)
        .create();
    let delete = server
        .mock("DELETE", "/repos/acme/api/actions/secrets/BAZ")
        .with_status(204)
        .expect(1)
        .create();
    let t = Test::with_config(CONFIG);

    let output = t.sync(&server.url(), &[]);

    assert_failure(&output);
    assert_stdout_contains(&output, "Bad request");
    assert_stderr_contains(&output, "1 operation(s) or target(s) failed");
    delete.assert();
}
