use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

fn boneclone(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("boneclone").expect("binary");
    cmd.current_dir(dir.path())
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn empty_provider_list_exits_cleanly() {
    let dir = TempDir::new().expect("tmp");
    fs::write(
        dir.path().join("config.yaml"),
        "providers: []\nidentifier:\n  filename: .boneclone.yaml\n  name: php\n",
    )
    .expect("write config");

    boneclone(&dir)
        .args(["run", "--config", "config.yaml"])
        .assert()
        .success()
        .stdout(contains("No repositories processed."));
}

#[test]
fn default_config_file_is_used() {
    let dir = TempDir::new().expect("tmp");
    fs::write(dir.path().join(".boneclone.yaml"), "providers: []\n").expect("write config");

    boneclone(&dir).arg("run").assert().success();
}

#[test]
fn missing_config_is_fatal() {
    let dir = TempDir::new().expect("tmp");

    boneclone(&dir)
        .args(["run", "-c", "absent.yaml"])
        .assert()
        .failure()
        .stderr(contains("absent.yaml"));
}

#[test]
fn unset_token_variable_is_fatal() {
    let dir = TempDir::new().expect("tmp");
    fs::write(
        dir.path().join(".boneclone.yaml"),
        "providers:\n  - provider: github\n    org: acme\n    token: ${BONECLONE_TEST_UNSET_TOKEN}\n",
    )
    .expect("write config");

    boneclone(&dir)
        .env_remove("BONECLONE_TEST_UNSET_TOKEN")
        .arg("run")
        .assert()
        .failure()
        .stderr(contains("BONECLONE_TEST_UNSET_TOKEN"));
}

#[test]
fn unreachable_provider_is_skipped_not_fatal() {
    let dir = TempDir::new().expect("tmp");
    fs::write(
        dir.path().join(".boneclone.yaml"),
        "providers:\n  - provider: github\n    org: acme\n    baseUrl: http://127.0.0.1:9\n",
    )
    .expect("write config");

    boneclone(&dir)
        .arg("run")
        .assert()
        .success()
        .stdout(contains("skipped").and(contains("github")));
}
