use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use tempfile::TempDir;

const SIG: [u8; 6] = [0x58, 0xFF, 0xBA, 0x35, 0x49, 0x41];

fn sigfind_in(dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sigfind"));
    cmd.current_dir(dir.path()).env_remove("SIGFIND_LOG");
    cmd
}

fn with_input(bytes: &[u8]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("harbor_binary_stripped"), bytes).unwrap();
    dir
}

#[test]
fn reports_offset_and_bytes() {
    let mut bytes = vec![0u8; 100];
    bytes.extend_from_slice(&SIG);
    bytes.extend_from_slice(&[0u8; 30]);
    let dir = with_input(&bytes);

    sigfind_in(&dir)
        .assert()
        .success()
        .stdout(predicate::str::diff(format!(
            "Encrypted data found at offset: 100\nBytes at offset: 58ffba354941{}\n",
            "00".repeat(14)
        )));
}

#[test]
fn exact_signature_file() {
    let dir = with_input(&SIG);

    sigfind_in(&dir).assert().success().stdout(
        "Encrypted data found at offset: 0\nBytes at offset: 58ffba354941\n",
    );
}

#[test]
fn not_found_is_success() {
    let dir = with_input(&[0x11; 50]);

    sigfind_in(&dir)
        .assert()
        .success()
        .stdout("Encrypted data found at offset: -1\n");
}

#[test]
fn repeated_runs_match() {
    let mut bytes = vec![0xAAu8; 64];
    bytes[5..11].copy_from_slice(&SIG);
    bytes[40..46].copy_from_slice(&SIG);
    let dir = with_input(&bytes);

    let first = sigfind_in(&dir).output().unwrap();
    let second = sigfind_in(&dir).output().unwrap();
    assert_eq!(first.stdout, second.stdout);
    assert!(String::from_utf8_lossy(&first.stdout)
        .starts_with("Encrypted data found at offset: 5\n"));
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();

    sigfind_in(&dir)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("failed to read harbor_binary_stripped"));
}
