// Copyright 2025 Dotanuki Labs
// SPDX-License-Identifier: MIT

use assert_cmd::Command;
use assertor::{BooleanAssertion, EqualityAssertion};
use httpmock::MockServer;
use predicates::str::contains;
use temp_dir::TempDir;

static ARCHIVED_GITEA_PAGE: &str = r#"
    <div class="ui warning message">
        This repository has been archived on 2024-02-11.
        You can view files and clone it, but cannot push or open issues or pull requests.
    </div>
    <footer>Powered by Gitea <a href="https://about.gitea.com">Website</a> English</footer>
"#;

fn sut() -> Command {
    Command::cargo_bin("tombstone").expect("Should be able to create a command")
}

#[test]
fn should_report_unconfirmed_repository() {
    let mock_server = MockServer::start();

    let mocked = mock_server.mock(|when, then| {
        when.method("GET").path("/owner/project");
        then.status(404).body("not found");
    });

    let execution = sut()
        .args(["--no-colors", "check", &mock_server.url("/owner/project")])
        .assert();

    execution
        .success()
        .stdout(contains("unconfirmed"))
        .stdout(contains("HTTP status code: 404"));

    mocked.assert();
}

#[test]
fn should_report_archived_repository() {
    let mock_server = MockServer::start();

    mock_server.mock(|when, then| {
        when.method("GET").path("/owner/project");
        then.status(200).body(ARCHIVED_GITEA_PAGE);
    });

    let execution = sut()
        .args(["--no-colors", "check", &mock_server.url("/owner/project")])
        .assert();

    execution.success().stdout(contains("status : archived"));
}

#[test]
fn should_audit_catalog_and_persist_checkpoint() {
    let mock_server = MockServer::start();
    let temp_dir = TempDir::new().expect("Cant create temp dir");
    let index_path = temp_dir.path().join("index.json");
    let checkpoint_path = temp_dir.path().join("results").join("checked.result.json");

    let mocked = mock_server.mock(|when, then| {
        when.method("GET").path("/owner/project");
        then.status(200).body(ARCHIVED_GITEA_PAGE);
    });

    let index = catalog_index(&mock_server.url("/owner/project"));
    std::fs::write(&index_path, index).expect("failed to write index file");

    for _ in 0..2 {
        sut()
            .args([
                "--no-colors",
                "audit",
                index_path.to_str().expect("valid path"),
                "--checkpoint",
                checkpoint_path.to_str().expect("valid path"),
                "-j",
                "2",
            ])
            .assert()
            .success()
            .stdout(contains("Statistics"));
    }

    mocked.assert_calls(1);
    assertor::assert_that!(checkpoint_path.exists()).is_true();

    let persisted = std::fs::read_to_string(&checkpoint_path).expect("checkpoint should be readable");
    assertor::assert_that!(persisted.contains("\"org.example.archived\"")).is_true();
    assertor::assert_that!(persisted.contains("\"repo_archived\": true")).is_true();
}

#[test]
fn should_refuse_missing_index() {
    let execution = sut().args(["audit", "/path/to/nowhere/index.json"]).assert();

    let output = execution.failure().get_output().clone();
    assertor::assert_that!(output.status.code()).is_equal_to(Some(1));
}

fn catalog_index(url: &str) -> String {
    format!(r#"[{{ "key": "org.example.archived", "url": "{}" }}]"#, url)
}
