use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn shows_help() {
    Command::cargo_bin("essaydesk")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--api-url"));
}

#[test]
fn shows_version() {
    Command::cargo_bin("essaydesk")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn lists_shortcuts() {
    Command::cargo_bin("essaydesk")
        .unwrap()
        .arg("--list-shortcuts")
        .assert()
        .success()
        .stdout(predicate::str::contains("Keyboard Shortcuts"))
        .stdout(predicate::str::contains("Ctrl+S"))
        .stdout(predicate::str::contains("Ctrl+Shift+L"))
        .stdout(predicate::str::contains("Ctrl+E"))
        .stdout(predicate::str::contains("Ctrl+N"));
}

#[test]
fn requires_a_file() {
    Command::cargo_bin("essaydesk")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("FILE"));
}

#[test]
fn rejects_zero_word_limit() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("essaydesk")
        .unwrap()
        .arg("--word-limit")
        .arg("0")
        .arg(dir.path().join("essay.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--word-limit"));
}

#[test]
fn api_mode_requires_university() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("essaydesk")
        .unwrap()
        .env_remove("ESSAYDESK_UNIVERSITY")
        .arg(dir.path().join("essay.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("--university"));
}
