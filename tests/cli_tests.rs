use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn cli_help_lists_commands() {
    Command::cargo_bin("openbook")
        .expect("binary exists")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("check-config"));
}

#[test]
fn cli_returns_nonzero_on_missing_config() {
    Command::cargo_bin("openbook")
        .expect("binary exists")
        .args(["check-config", "--config", "/definitely/not/here/openbook.toml"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Failed to load config"));
}

#[test]
fn cli_returns_nonzero_on_invalid_config() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "[book]\nlevels = 7\n").expect("write config");

    Command::cargo_bin("openbook")
        .expect("binary exists")
        .arg("check-config")
        .arg("--config")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("levels"));
}

#[test]
fn cli_check_config_prints_summary() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, "symbols = [\"ethusdt\"]\n").expect("write config");

    Command::cargo_bin("openbook")
        .expect("binary exists")
        .arg("check-config")
        .arg("--config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("ethusdt"))
        .stdout(predicate::str::contains("disabled"));
}

#[test]
fn cli_watch_requires_symbol() {
    Command::cargo_bin("openbook")
        .expect("binary exists")
        .arg("watch")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--symbol"));
}
