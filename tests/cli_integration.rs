//! End-to-end tests for the `credvault` binary.
//!
//! The master password comes from `CREDVAULT_PASSWORD` so no test needs
//! a terminal.  Each test gets its own directory with a config file that
//! turns Argon2 down to its floor to keep the suite fast.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

const MASTER: &str = "correct horse battery";

const FAST_CONFIG: &str = "\
argon2_memory_kib = 8192
argon2_iterations = 1
argon2_parallelism = 1
";

fn credvault() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("credvault").expect("binary should exist")
}

/// A fresh project directory with the fast config in place.
fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    tmp.child(".credvault.toml").write_str(FAST_CONFIG).unwrap();
    tmp
}

/// `credvault <args>` run inside `dir` with the given master password.
fn run_in(dir: &TempDir, password: &str, args: &[&str]) -> assert_cmd::assert::Assert {
    credvault()
        .args(args)
        .current_dir(dir.path())
        .env("CREDVAULT_PASSWORD", password)
        .env_remove("CREDVAULT_LOG")
        .assert()
}

fn initialized() -> TempDir {
    let tmp = project();
    run_in(&tmp, MASTER, &["init"]).success();
    tmp
}

#[test]
fn help_lists_commands() {
    credvault()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Encrypted personal credential vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("remove"))
        .stdout(predicate::str::contains("summary"))
        .stdout(predicate::str::contains("shell"));
}

#[test]
fn version_flag_shows_version() {
    credvault()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("credvault"));
}

#[test]
fn no_args_shows_usage() {
    credvault()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn list_before_init_fails() {
    let tmp = project();
    run_in(&tmp, MASTER, &["list"])
        .failure()
        .stderr(predicate::str::contains("credvault init"));
}

#[test]
fn init_creates_slots_and_gitignore() {
    let tmp = initialized();

    tmp.child(".credvault/passwords.slot")
        .assert(predicate::path::exists());
    tmp.child(".credvault/passwords.auth.slot")
        .assert(predicate::path::exists());
    tmp.child(".gitignore")
        .assert(predicate::str::contains(".credvault/"));
}

#[test]
fn init_twice_fails() {
    let tmp = initialized();
    run_in(&tmp, MASTER, &["init"])
        .failure()
        .stderr(predicate::str::contains("already initialized"));
}

#[test]
fn init_rejects_short_master_password() {
    let tmp = project();
    run_in(&tmp, "short", &["init"])
        .failure()
        .stderr(predicate::str::contains("at least 8"));
}

#[test]
fn add_then_list_masks_password() {
    let tmp = initialized();

    run_in(&tmp, MASTER, &["add", "GitHub", "alice", "-c", "work", "hunter22"])
        .success()
        .stdout(predicate::str::contains("Added 'GitHub'"));

    run_in(&tmp, MASTER, &["list"])
        .success()
        .stdout(predicate::str::contains("GitHub"))
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("hunter22").not());

    run_in(&tmp, MASTER, &["list", "--category", "banking"])
        .success()
        .stdout(predicate::str::contains("GitHub").not());
}

#[test]
fn slot_file_never_holds_plaintext() {
    let tmp = initialized();
    run_in(&tmp, MASTER, &["add", "GitHub", "alice", "hunter22"]).success();

    let raw = std::fs::read_to_string(tmp.path().join(".credvault/passwords.slot")).unwrap();
    assert!(!raw.contains("hunter22"));
    assert!(!raw.contains("alice"));
}

#[test]
fn summary_counts_per_category() {
    let tmp = initialized();
    run_in(&tmp, MASTER, &["add", "GitHub", "alice", "-c", "work", "pw-one"]).success();
    run_in(&tmp, MASTER, &["add", "Slack", "alice", "-c", "work", "pw-two"]).success();
    run_in(&tmp, MASTER, &["add", "Chase", "alice", "-c", "banking", "pw-three"]).success();

    run_in(&tmp, MASTER, &["summary"])
        .success()
        .stdout(predicate::str::contains("work"))
        .stdout(predicate::str::contains("banking"))
        .stdout(predicate::str::contains("Total: 3"));
}

#[test]
fn wrong_master_password_is_rejected() {
    let tmp = initialized();
    run_in(&tmp, "not the password", &["list"])
        .failure()
        .stderr(predicate::str::contains("Authentication failed"));
}

#[test]
fn unknown_category_is_rejected() {
    let tmp = initialized();
    run_in(&tmp, MASTER, &["add", "Steam", "alice", "-c", "games", "pw"])
        .failure()
        .stderr(predicate::str::contains("unknown category"));
}

#[test]
fn get_unknown_id_fails() {
    let tmp = initialized();
    run_in(&tmp, MASTER, &["get", "no-such-id"])
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn remove_unknown_id_is_not_an_error() {
    let tmp = initialized();
    run_in(&tmp, MASTER, &["remove", "no-such-id", "--force"])
        .success()
        .stdout(predicate::str::contains("Nothing removed"));
}

#[test]
fn vault_dir_flag_overrides_config() {
    let tmp = project();
    run_in(&tmp, MASTER, &["init", "--vault-dir", "elsewhere"]).success();
    tmp.child("elsewhere/passwords.slot")
        .assert(predicate::path::exists());
}

#[test]
fn completions_for_bash() {
    credvault()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("credvault"));
}
