use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn cargo_bin() -> Command {
    let mut cmd = Command::cargo_bin("bfc").unwrap();
    cmd.env_remove("BF_EOF").env_remove("BF_LOG");
    cmd
}

#[test]
fn tilde_slash_expands_to_home() {
    let home = tempfile::tempdir().unwrap();
    fs::write(home.path().join("prog.b"), "++++++++[>++++++++<-]>+.").unwrap();

    cargo_bin()
        .env("HOME", home.path())
        .arg("~/prog.b")
        .assert()
        .success()
        .stdout("A");
}

#[test]
fn tilde_slash_without_home_fails() {
    cargo_bin()
        .env_remove("HOME")
        .arg("~/prog.b")
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("HOME environment variable not set"));
}

#[test]
fn home_is_not_needed_for_plain_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prog.b");
    fs::write(&path, "+.").unwrap();

    cargo_bin()
        .env_remove("HOME")
        .arg(&path)
        .assert()
        .success()
        .stdout(&b"\x01"[..]);
}
