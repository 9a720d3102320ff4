#![cfg(unix)]
#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const INIT_LINE: &str =
    r#"{"type":"system","subtype":"init","session_id":"s1","model":"fake","tools":[]}"#;

const GOOD_REPLY: &str = r#"Here you go: {"name":"Foo","tagline":"Fast things for busy people","description":"Foo does X. It is great for Y.","tags":["CLI","git","rust"]}"#;

struct Fixture {
    home: TempDir,
    repo: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fx = Fixture {
            home: TempDir::new().unwrap(),
            repo: TempDir::new().unwrap(),
        };
        std::fs::write(fx.repo.path().join("README.md"), "# Foo\n\nFoo does X.\n").unwrap();
        fx
    }

    fn toolsubmit(&self) -> Command {
        let mut cmd = Command::cargo_bin("toolsubmit").unwrap();
        cmd.env("HOME", self.home.path())
            .env_remove("TOOLSUBMIT_MODEL")
            .env_remove("TOOLSUBMIT_CLI_PATH")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Write an executable stand-in for the AI CLI that runs `body` after
    /// reading the prompt from stdin into `$input`.
    fn fake_cli(&self, body: &str) -> PathBuf {
        let path = self.home.path().join("fake-claude");
        std::fs::write(&path, format!("#!/bin/sh\ninput=$(cat)\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}

/// A stream-json success result carrying `reply` as the assistant's answer.
fn result_line(reply: &str) -> String {
    serde_json::json!({
        "type": "result",
        "subtype": "success",
        "session_id": "s1",
        "result": reply,
        "num_turns": 1,
    })
    .to_string()
}

/// Shell that prints one exchange: init then a result.
fn respond(reply: &str) -> String {
    format!("printf '%s\\n' '{INIT_LINE}' '{}'", result_line(reply))
}

fn headless(fx: &Fixture, cli: &Path) -> Command {
    let mut cmd = fx.toolsubmit();
    cmd.arg(fx.repo.path())
        .arg("--headless")
        .arg("--cli-path")
        .arg(cli);
    cmd
}

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[test]
fn headless_prints_prefilled_issue_url() {
    let fx = Fixture::new();
    let cli = fx.fake_cli(&respond(GOOD_REPLY));

    headless(&fx, &cli)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "https://github.com/toolsubmit/registry/issues/new?template=tool-submission.yml",
        ))
        .stdout(predicate::str::contains("name=Foo"))
        .stdout(predicate::str::contains("tags=cli%2C+git%2C+rust"));
}

#[test]
fn json_output_carries_metadata_and_url() {
    let fx = Fixture::new();
    let cli = fx.fake_cli(&respond(GOOD_REPLY));

    let out = headless(&fx, &cli)
        .arg("--json")
        .arg("--theme")
        .arg("Ocean")
        .output()
        .unwrap();
    assert!(out.status.success());

    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["metadata"]["name"], "Foo");
    assert_eq!(v["metadata"]["tags"], "cli, git, rust");
    assert_eq!(v["metadata"]["theme"], "ocean");
    assert!(v["url"].as_str().unwrap().contains("theme=ocean"));
}

#[test]
fn invalid_reply_is_repaired() {
    let fx = Fixture::new();
    let first = r#"{"name":"Foo","tagline":"Fast","description":"Foo does X.","tags":["cli"]}"#;
    let body = format!(
        "case \"$input\" in\n  *\"does not meet\"*) {} ;;\n  *) {} ;;\nesac",
        respond(GOOD_REPLY),
        respond(first)
    );
    let cli = fx.fake_cli(&body);

    headless(&fx, &cli)
        .assert()
        .success()
        .stdout(predicate::str::contains("tags=cli%2C+git%2C+rust"))
        .stdout(predicate::str::contains("tagline=Fast+things+for+busy+people"));
}

#[test]
fn failed_repair_falls_back_to_default_tags() {
    let fx = Fixture::new();
    let reply = r#"{"name":"Foo","tagline":"Fast","description":"Foo does X.","tags":["cli"]}"#;
    let cli = fx.fake_cli(&respond(reply));

    headless(&fx, &cli)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "tags=cli%2C+developer-tools%2C+productivity",
        ))
        .stdout(predicate::str::contains("tagline=Fast"));
}

#[test]
fn repair_exchange_resumes_first_session() {
    let fx = Fixture::new();
    let log = fx.home.path().join("calls.log");
    let first = r#"{"name":"Foo","tagline":"Fast","description":"Foo does X.","tags":["cli"]}"#;
    let body = format!(
        "printf '%s\\n' \"$*\" >> '{}'\ncase \"$input\" in\n  *\"does not meet\"*) {} ;;\n  *) {} ;;\nesac",
        log.display(),
        respond(GOOD_REPLY),
        respond(first)
    );
    let cli = fx.fake_cli(&body);

    headless(&fx, &cli).assert().success();

    let calls = std::fs::read_to_string(&log).unwrap();
    let calls: Vec<&str> = calls.lines().collect();
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].contains("--resume"));
    assert!(calls[1].contains("--resume s1"));
}

#[test]
fn non_utf8_readme_is_still_submitted() {
    let fx = Fixture::new();
    std::fs::write(fx.repo.path().join("README.md"), b"# Caf\xe9 tool\n\nA tool.\n").unwrap();
    let cli = fx.fake_cli(&respond(GOOD_REPLY));

    headless(&fx, &cli)
        .assert()
        .success()
        .stdout(predicate::str::contains("name=Foo"));
}

#[test]
fn config_file_overrides_issue_endpoint() {
    let fx = Fixture::new();
    let cli = fx.fake_cli(&respond(GOOD_REPLY));
    let config = fx.home.path().join("custom.yaml");
    std::fs::write(
        &config,
        "issue_url: https://example.com/acme/tools/issues/new\nissue_template: listing.yml\n",
    )
    .unwrap();

    headless(&fx, &cli)
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "https://example.com/acme/tools/issues/new?template=listing.yml",
        ));
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn missing_directory_fails() {
    let fx = Fixture::new();
    fx.toolsubmit()
        .arg(fx.repo.path().join("nope"))
        .arg("--headless")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("error: directory not found"));
}

#[test]
fn missing_readme_fails_in_headless_mode() {
    let fx = Fixture::new();
    std::fs::remove_file(fx.repo.path().join("README.md")).unwrap();
    let cli = fx.fake_cli(&respond(GOOD_REPLY));

    headless(&fx, &cli)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no README found"));
}

#[test]
fn missing_ai_cli_fails() {
    let fx = Fixture::new();
    headless(&fx, &fx.home.path().join("no-such-claude"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("AI CLI not found"));
}

#[test]
fn reply_without_json_fails() {
    let fx = Fixture::new();
    let cli = fx.fake_cli(&respond("Sorry, I cannot help with that."));

    headless(&fx, &cli)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to generate metadata"));
}

#[test]
fn crashing_ai_cli_reports_lost_connection() {
    let fx = Fixture::new();
    let cli = fx.fake_cli("echo 'rate limited' >&2\nexit 3");

    headless(&fx, &cli)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("lost connection to the AI CLI"))
        .stderr(predicate::str::contains("exited with code 3: rate limited"));
}

#[test]
fn error_result_is_not_a_lost_connection() {
    let fx = Fixture::new();
    let line = serde_json::json!({
        "type": "result",
        "subtype": "error_max_turns",
        "session_id": "s1",
        "is_error": true,
        "num_turns": 1,
        "errors": ["Reached maximum turn limit"],
    })
    .to_string();
    let cli = fx.fake_cli(&format!("printf '%s\\n' '{INIT_LINE}' '{line}'"));

    headless(&fx, &cli)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("failed to generate metadata"))
        .stderr(predicate::str::contains("lost connection").not());
}

#[test]
fn unknown_theme_is_rejected_by_argument_parsing() {
    let fx = Fixture::new();
    fx.toolsubmit()
        .arg(fx.repo.path())
        .arg("--headless")
        .arg("--theme")
        .arg("neon")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid theme 'neon'"));
}
