//! CLI integration tests using assert_cmd.
//!
//! Black-box tests of the `primeforge` binary: help output, argument
//! validation, generation output formats, config files, and `check` exit
//! codes. No network access needed.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

#[allow(deprecated)]
fn primeforge() -> Command {
    let mut cmd = Command::cargo_bin("primeforge").unwrap();
    // Keep the user's environment from leaking into assertions.
    cmd.env_remove("LOG_FORMAT")
        .env_remove("RUST_LOG")
        .env("PRIMEFORGE_CONFIG", "/nonexistent/primeforge.toml");
    cmd
}

// --- Help and arg validation ---

#[test]
fn help_shows_subcommands() {
    primeforge().arg("--help").assert().success().stdout(
        predicate::str::contains("generate")
            .and(predicate::str::contains("check"))
            .and(predicate::str::contains("--config")),
    );
}

#[test]
fn help_generate_shows_args() {
    primeforge()
        .args(["generate", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--bits")
                .and(predicate::str::contains("--safe"))
                .and(predicate::str::contains("--add"))
                .and(predicate::str::contains("--rem"))
                .and(predicate::str::contains("--count"))
                .and(predicate::str::contains("--format")),
        );
}

#[test]
fn generate_requires_bits() {
    primeforge()
        .arg("generate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--bits"));
}

#[test]
fn add_without_rem_is_rejected() {
    primeforge()
        .args(["generate", "--bits", "64", "--add", "0c"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--rem"));
}

#[test]
fn too_few_bits_is_usage_error() {
    primeforge()
        .args(["generate", "--bits", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid bits"));
}

#[test]
fn incompatible_safe_constraint_is_usage_error() {
    primeforge()
        .args(["generate", "--bits", "64", "--safe", "--add", "08", "--rem", "01"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid rem"));
}

// --- Generation ---

#[test]
fn generate_prints_hex_with_guard_byte() {
    let output = primeforge()
        .args(["generate", "--bits", "64"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let line = String::from_utf8(output).unwrap();
    let line = line.trim();
    assert_eq!(line.len(), 18, "unexpected output {line:?}");
    assert!(line.starts_with("00"));
    let bytes: Vec<u8> = (0..line.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&line[i..i + 2], 16).unwrap())
        .collect();
    assert!(primeforge::check_prime(&bytes, 0).unwrap());
}

#[test]
fn generate_count_prints_one_prime_per_line() {
    let output = primeforge()
        .args(["--threads", "2", "generate", "--bits", "48", "--count", "5", "--format", "decimal"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let text = String::from_utf8(output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    for line in lines {
        let p = rug::Integer::from_str_radix(line, 10).unwrap();
        assert_eq!(p.significant_bits(), 48);
        assert!(common::gmp_says_prime(&p));
    }
}

#[test]
fn generate_json_with_constraint() {
    let output = primeforge()
        .args([
            "generate", "--bits", "40", "--safe", "--add", "0x0c", "--rem", "0x0b", "--format",
            "json",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["bits"], 40);
    assert_eq!(json["safe"], true);
    let p = rug::Integer::from_str_radix(json["decimal"].as_str().unwrap(), 10).unwrap();
    assert_eq!(p.mod_u(12), 11);
}

#[test]
fn config_budget_is_applied() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[generation]\nmax_attempts = 5").unwrap();
    // Every 4-bit safe candidate is 15, so a tiny budget must run out.
    primeforge()
        .env("PRIMEFORGE_CONFIG", file.path())
        .args(["generate", "--bits", "4", "--safe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("within 5 attempts"));
}

#[test]
fn invalid_config_is_reported() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[generation]\nmax_attempts = 0").unwrap();
    primeforge()
        .arg("--config")
        .arg(file.path())
        .args(["check", "7"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid configuration"));
}

// --- Check ---

#[test]
fn check_prime_exits_zero() {
    primeforge()
        .args(["check", "7919"])
        .assert()
        .success()
        .stdout(predicate::str::diff("prime\n"));
}

#[test]
fn check_composite_exits_one() {
    primeforge()
        .args(["check", "561"])
        .assert()
        .code(1)
        .stdout(predicate::str::diff("composite\n"));
}

#[test]
fn check_accepts_hex_and_base64() {
    primeforge()
        .args(["check", "--input", "hex", "0x1eef", "--rounds", "5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("prime"));
    primeforge()
        .args(["check", "--input", "base64", "Hu8="])
        .assert()
        .success();
}

#[test]
fn check_rejects_malformed_value() {
    primeforge()
        .args(["check", "12abc"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a non-negative decimal integer"));
}

#[test]
fn check_errors_are_distinct_from_composite() {
    primeforge()
        .args(["check", "--input", "base64", "!!!"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn generate_rejects_zero_count() {
    primeforge()
        .args(["generate", "--bits", "32", "--count", "0"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--count"));
}

#[test]
fn generate_rejects_hopeless_constraint() {
    primeforge()
        .args(["generate", "--bits", "2048", "--safe", "--add", "03", "--rem", "01"])
        .timeout(std::time::Duration::from_secs(30))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("invalid rem"));
}
