mod common;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};

use common::TestWorkspace;

fn config_command(credentials: &std::path::Path, extra: &[&str]) -> Command {
    let mut command = Command::cargo_bin("csv-insight").expect("binary exists");
    command.args(["config", "--credentials", credentials.to_str().unwrap()]);
    command.args(extra);
    command
}

#[test]
fn stored_keys_are_listed_masked() {
    let workspace = TestWorkspace::new();
    let credentials = workspace.path().join("credentials.json");

    config_command(&credentials, &["--provider", "openai", "--api-key", "sk-test-123"])
        .assert()
        .success();

    config_command(&credentials, &["--list"])
        .assert()
        .success()
        .stdout(
            contains("openai")
                .and(contains("true"))
                .and(contains("sk-t..."))
                .and(contains("sk-test-123").not()),
        );
}

#[test]
fn id_secret_pairs_round_trip() {
    let workspace = TestWorkspace::new();
    let credentials = workspace.path().join("credentials.json");

    config_command(
        &credentials,
        &[
            "--provider",
            "baidu",
            "--client-id",
            "client-a",
            "--client-secret",
            "hunter2secret",
        ],
    )
    .assert()
    .success();

    config_command(&credentials, &["--list"])
        .assert()
        .success()
        .stdout(
            contains("baidu")
                .and(contains("client-a"))
                .and(contains("hunt..."))
                .and(contains("hunter2secret").not()),
        );
}

#[test]
fn clear_removes_the_stored_credential() {
    let workspace = TestWorkspace::new();
    let credentials = workspace.path().join("credentials.json");

    config_command(&credentials, &["--provider", "openai", "--api-key", "sk-test-123"])
        .assert()
        .success();
    config_command(&credentials, &["--provider", "openai", "--clear"])
        .assert()
        .success();

    config_command(&credentials, &["--list"])
        .assert()
        .success()
        .stdout(contains("sk-t...").not());
}

#[test]
fn unknown_provider_is_rejected() {
    let workspace = TestWorkspace::new();
    let credentials = workspace.path().join("credentials.json");

    config_command(&credentials, &["--provider", "tencent", "--api-key", "k"])
        .assert()
        .failure()
        .stderr(contains("tencent"));
}

#[test]
fn credential_shape_must_be_complete() {
    let workspace = TestWorkspace::new();
    let credentials = workspace.path().join("credentials.json");

    config_command(&credentials, &["--provider", "baidu", "--client-id", "only-half"])
        .assert()
        .failure()
        .stderr(contains("--client-secret"));
}
