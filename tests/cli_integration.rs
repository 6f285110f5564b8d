//! Integration tests for the s7n CLI.
//!
//! These tests exercise the binary end-to-end using `assert_cmd`. The
//! master key is supplied through `S7N_MASTER_KEY` so no prompt is shown.

use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

use s7n::crypto::{Cipher, CipherAlgorithm, Key, KeyAlgorithm};
use s7n::import::gpass::IV;

/// Helper: get a Command pointing at the s7n binary.
fn s7n() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("s7n").expect("binary should exist")
}

/// Helper: a command against the vault in `tmp` with the master key set.
fn s7n_in(tmp: &TempDir) -> Command {
    let mut cmd = s7n();
    cmd.arg("--base-dir")
        .arg(tmp.path().join("vault"))
        .env("S7N_MASTER_KEY", "qwerty")
        .env_remove("S7N_GPASS_PASSPHRASE")
        .env_remove("S7N_LOG");
    cmd
}

/// A GPass file with one folder and one password entry inside it.
fn gpass_fixture(passphrase: &str) -> Vec<u8> {
    fn text(s: &str) -> Vec<u8> {
        let mut out = vec![s.len() as u8];
        out.extend_from_slice(s.as_bytes());
        out
    }
    fn record(id: u32, parent: u32, kind: &str, body: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&id.to_le_bytes());
        out.extend_from_slice(&parent.to_le_bytes());
        out.extend_from_slice(&(kind.len() as u32).to_le_bytes());
        out.extend_from_slice(kind.as_bytes());
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    // name, description, created_at, updated_at, expiration, expire_at
    let mut folder = text("work");
    folder.extend([0, 0, 0, 0, 0]);
    let mut password = text("mail");
    password.extend([0, 0, 0, 0, 0]);
    password.extend(text("alice"));
    password.extend(text("s3cret"));

    let mut plaintext = b"GPassFile version 1.1.0".to_vec();
    plaintext.extend(record(1, 0, "folder", &folder));
    plaintext.extend(record(2, 1, "password", &password));

    let key = Key::derive(KeyAlgorithm::Sha1, passphrase.as_bytes());
    Cipher::with_key(CipherAlgorithm::BlowfishCbc, &key, &IV, true)
        .encrypt_bytes(&plaintext)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Usage
// ---------------------------------------------------------------------------

#[test]
fn help_flag_shows_usage() {
    s7n()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Local encrypted secrets vault"))
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("cipher"));
}

#[test]
fn version_flag_shows_version() {
    s7n()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("s7n"));
}

#[test]
fn no_args_shows_help() {
    s7n()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

// ---------------------------------------------------------------------------
// Vault lifecycle
// ---------------------------------------------------------------------------

#[test]
fn init_creates_vault_files() {
    let tmp = TempDir::new().unwrap();

    s7n_in(&tmp)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Vault created"));

    tmp.child("vault/secrets")
        .assert(predicate::path::is_file());
    tmp.child("vault/configuration")
        .assert(predicate::str::contains("AES-256-CBC"));
    tmp.child("vault/lock").assert(predicate::path::missing());
}

#[test]
fn init_twice_fails() {
    let tmp = TempDir::new().unwrap();
    s7n_in(&tmp).arg("init").assert().success();

    s7n_in(&tmp)
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn list_on_empty_vault() {
    let tmp = TempDir::new().unwrap();
    s7n_in(&tmp).arg("init").assert().success();

    s7n_in(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries"));
}

#[test]
fn wrong_master_key_fails() {
    let tmp = TempDir::new().unwrap();
    s7n_in(&tmp).arg("init").assert().success();

    s7n_in(&tmp)
        .env("S7N_MASTER_KEY", "QWERTY")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid passphrase"));
}

#[test]
fn import_then_list_and_show() {
    let tmp = TempDir::new().unwrap();
    let gpass = tmp.child("passwords.gps");
    gpass.write_binary(&gpass_fixture("gpass-pw")).unwrap();

    s7n_in(&tmp).arg("init").assert().success();
    s7n_in(&tmp)
        .arg("import")
        .arg(gpass.path())
        .env("S7N_GPASS_PASSPHRASE", "gpass-pw")
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 entries"));

    s7n_in(&tmp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("mail"))
        .stdout(predicate::str::contains("work"));

    s7n_in(&tmp)
        .args(["list", "--tag", "home"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No entries"));

    s7n_in(&tmp)
        .args(["show", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("******"))
        .stdout(predicate::str::contains("s3cret").not());

    s7n_in(&tmp)
        .args(["show", "1", "--reveal"])
        .assert()
        .success()
        .stdout(predicate::str::contains("s3cret"));

    tmp.child("vault/secrets.bak")
        .assert(predicate::path::is_file());
}

#[test]
fn import_with_wrong_passphrase_fails() {
    let tmp = TempDir::new().unwrap();
    let gpass = tmp.child("passwords.gps");
    gpass.write_binary(&gpass_fixture("gpass-pw")).unwrap();

    s7n_in(&tmp).arg("init").assert().success();
    s7n_in(&tmp)
        .arg("import")
        .arg(gpass.path())
        .env("S7N_GPASS_PASSPHRASE", "nope")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid passphrase"));
}

#[test]
fn show_unknown_id_fails() {
    let tmp = TempDir::new().unwrap();
    s7n_in(&tmp).arg("init").assert().success();

    s7n_in(&tmp)
        .args(["show", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No such entry: id=<42>"));
}

#[test]
fn cipher_change_is_persisted() {
    let tmp = TempDir::new().unwrap();
    s7n_in(&tmp).arg("init").assert().success();

    s7n_in(&tmp)
        .args(["cipher", "BF-CBC"])
        .assert()
        .success()
        .stdout(predicate::str::contains("AES-256-CBC to BF-CBC"));

    s7n_in(&tmp)
        .arg("cipher")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cipher: BF-CBC"));

    tmp.child("vault/configuration")
        .assert(predicate::str::contains("BF-CBC"));
}

#[test]
fn cipher_rejects_unknown_algorithm() {
    let tmp = TempDir::new().unwrap();
    s7n_in(&tmp).arg("init").assert().success();

    s7n_in(&tmp)
        .args(["cipher", "ROT13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown cipher algorithm: ROT13"));
}

#[test]
fn live_lock_blocks_commands() {
    let tmp = TempDir::new().unwrap();
    s7n_in(&tmp).arg("init").assert().success();
    // PID 1 is always alive.
    tmp.child("vault/lock").write_str("1").unwrap();

    s7n_in(&tmp)
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Running other s7n: pid=<1>"));
}
