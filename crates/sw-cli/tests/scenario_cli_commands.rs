//! Scenario: `sw` subcommands end to end.
//!
//! # Invariants under test
//! - `sign` prints the base64 HMAC of the exact file bytes.
//! - `sign` with an unset secret var fails and names the var.
//! - `config-hash` is stable and refuses literal credentials.
//! - `reconcile` runs one pass against the configured catalog and exits
//!   non-zero when a brand fails.

use std::fs;

use assert_cmd::Command;
use httpmock::prelude::*;
use predicates::prelude::*;
use serde_json::json;

const PRODUCTS_PATH: &str = "/admin/api/2024-01/products.json";

fn sw() -> Command {
    let mut cmd = Command::cargo_bin("sw").unwrap();
    // Never pick up a developer's .env.local or log filter.
    cmd.current_dir(std::env::temp_dir()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn sign_prints_signature_of_file_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let body = dir.path().join("body.json");
    fs::write(&body, br#"{"a":1}"#).unwrap();

    let expected = sw_signature_of(b"s3cr3t", br#"{"a":1}"#);

    sw().args(["sign", "--secret-env", "SW_CLI_T_SECRET", "--body"])
        .arg(&body)
        .env("SW_CLI_T_SECRET", "s3cr3t")
        .assert()
        .success()
        .stdout(predicate::str::diff(format!("{expected}\n")));
}

#[test]
fn sign_without_secret_names_the_var() {
    let dir = tempfile::tempdir().unwrap();
    let body = dir.path().join("body.json");
    fs::write(&body, b"{}").unwrap();

    sw().args(["sign", "--secret-env", "SW_CLI_T_UNSET_SECRET", "--body"])
        .arg(&body)
        .env_remove("SW_CLI_T_UNSET_SECRET")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SECRETS_MISSING"))
        .stderr(predicate::str::contains("SW_CLI_T_UNSET_SECRET"));
}

#[test]
fn config_hash_is_stable_and_rejects_literal_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let ok = dir.path().join("ok.yaml");
    fs::write(&ok, "monitor:\n  brands: [Acme]\n").unwrap();

    let first = sw().arg("config-hash").arg(&ok).assert().success();
    let out1 = String::from_utf8(first.get_output().stdout.clone()).unwrap();
    let out2 = String::from_utf8(
        sw().arg("config-hash")
            .arg(&ok)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone(),
    )
    .unwrap();
    assert_eq!(out1, out2);
    assert!(out1.starts_with("config_hash="));

    let bad = dir.path().join("bad.yaml");
    fs::write(
        &bad,
        "catalog:\n  access_token_env: \"shpat_0123456789abcdef0123\"\n",
    )
    .unwrap();
    sw().arg("config-hash")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("CONFIG_SECRET_DETECTED"))
        .stderr(predicate::str::contains("shpat_0123456789abcdef0123").not());
}

fn config_for(server: &MockServer, brands: &[&str]) -> String {
    format!(
        r#"
catalog:
  base_url: "{base}"
  access_token_env: "SW_CLI_T_TOKEN"
monitor:
  brands: {brands:?}
  inter_brand_delay_ms: 0
notify:
  transport: log
webhook:
  secret_env: "SW_CLI_T_HOOK"
"#,
        base = server.base_url(),
    )
}

#[test]
fn reconcile_runs_one_pass_and_reports_json() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET)
            .path(PRODUCTS_PATH)
            .query_param("vendor", "Acme")
            .header("X-Shopify-Access-Token", "tok");
        then.status(200).json_body(json!({
            "products": [
                {"id": 1, "title": "tee", "variants": [{"inventory_quantity": 0}]},
                {"id": 2, "title": "cap", "variants": [{"inventory_quantity": 0}]}
            ]
        }));
    });

    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("stockwatch.yaml");
    fs::write(&cfg, config_for(&server, &["Acme"])).unwrap();

    let assert = sw()
        .args(["reconcile", "--json", "--config"])
        .arg(&cfg)
        .env("SW_CLI_T_TOKEN", "tok")
        .env("SW_CLI_T_HOOK", "hook")
        .assert()
        .success();

    let report: serde_json::Value =
        serde_json::from_slice(&assert.get_output().stdout).unwrap();
    assert_eq!(report["trigger"], "cli");
    assert_eq!(report["brands"][0]["brand"], "Acme");
    assert_eq!(report["brands"][0]["outcome"], "alerted");
    assert_eq!(report["brands"][0]["kind"], "depleted");
    assert_eq!(report["brands"][0]["snapshot"]["total_products"], 2);
}

#[test]
fn reconcile_exits_non_zero_when_a_brand_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path(PRODUCTS_PATH).query_param("vendor", "Acme");
        then.status(200).json_body(json!({ "products": [] }));
    });
    server.mock(|when, then| {
        when.method(GET).path(PRODUCTS_PATH).query_param("vendor", "Globex");
        then.status(503);
    });

    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("stockwatch.yaml");
    fs::write(&cfg, config_for(&server, &["Acme", "Globex"])).unwrap();

    sw().args(["reconcile", "--config"])
        .arg(&cfg)
        .env("SW_CLI_T_TOKEN", "tok")
        .env("SW_CLI_T_HOOK", "hook")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Acme: seeded IN_STOCK"))
        .stdout(predicate::str::contains("Globex: FAILED at Catalog"))
        .stderr(predicate::str::contains("RECONCILE_INCOMPLETE"));
}

#[test]
fn reconcile_without_secrets_fails_at_startup() {
    let server = MockServer::start();
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("stockwatch.yaml");
    fs::write(&cfg, config_for(&server, &["Acme"])).unwrap();

    sw().args(["reconcile", "--config"])
        .arg(&cfg)
        .env_remove("SW_CLI_T_TOKEN")
        .env_remove("SW_CLI_T_HOOK")
        .assert()
        .failure()
        .stderr(predicate::str::contains("SECRETS_MISSING"))
        .stderr(predicate::str::contains("SW_CLI_T_TOKEN"));
}

fn sw_signature_of(secret: &[u8], body: &[u8]) -> String {
    sw_signature::sign(secret, body).unwrap()
}
