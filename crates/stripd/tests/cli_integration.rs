//! Integration tests for the `stripd` binary.
//!
//! These tests exercise the binary via `assert_cmd`, verifying that the
//! offline subcommands (help, version, check, config, send) behave, and that
//! `serve` fails cleanly on bad settings instead of binding.

use std::net::UdpSocket;
use std::path::{Path, PathBuf};
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn cli() -> assert_cmd::Command {
    cargo_bin_cmd!("stripd")
}

/// Write a config.toml pointing at a settings file in `dir`.
fn write_config(dir: &Path, settings_json: &str) -> PathBuf {
    let settings = dir.join("settings.json");
    std::fs::write(&settings, settings_json).unwrap();
    let config = dir.join("config.toml");
    std::fs::write(
        &config,
        format!(
            "bind = \"127.0.0.1:0\"\nsettings_path = {:?}\n",
            settings.display().to_string()
        ),
    )
    .unwrap();
    config
}

#[test]
fn cli_help_succeeds() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("stripd"));
}

#[test]
fn cli_version_prints_version() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

// ── check ──

#[test]
fn cli_check_prints_canonical_form() {
    cli()
        .args(["check", "stroke( 2 , 6 , 16777215 )"])
        .assert()
        .success()
        .stdout(predicate::str::contains("stroke(2,6,0xFFFFFF)"));
}

#[test]
fn cli_check_rejects_missing_paren() {
    cli()
        .args(["check", "pixel(2,0xFFFFFF"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing closing parenthesis"));
}

#[test]
fn cli_check_json_produces_valid_json() {
    let output = cli()
        .args(["--json", "check", "pixel(3,0xFF0000)"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("check --json should produce valid JSON");
    assert_eq!(json["valid"], true);
    assert_eq!(json["parsed"]["command"], "pixel");
    assert_eq!(json["parsed"]["index"], 3);
}

#[test]
fn cli_check_json_reports_error() {
    let output = cli()
        .args(["--json", "check", "blink()"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let json: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(json["valid"], false);
    assert!(json["error"].as_str().unwrap().contains("blink"));
}

// ── config ──

#[test]
fn cli_config_json_reports_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), r#"{"brightness": 40, "pixel_count": 144}"#);

    let output = cli()
        .arg("--config")
        .arg(&config)
        .args(["--json", "config"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json: serde_json::Value =
        serde_json::from_slice(&output).expect("config --json should produce valid JSON");
    assert_eq!(json["config_file_exists"], true);
    assert_eq!(json["daemon"]["bind"], "127.0.0.1:0");
    assert_eq!(json["settings"]["brightness"], 40);
    assert_eq!(json["settings"]["pixel_count"], 144);
}

#[test]
fn cli_config_human_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), r#"{"brightness": 40, "pixel_count": 144}"#);
    cli()
        .arg("--config")
        .arg(&config)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("pixel_count:"))
        .stdout(predicate::str::contains("144"));
}

#[test]
fn cli_config_init_writes_defaults_and_refuses_overwrite() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "--init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote default config"));
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("bind = \"0.0.0.0:8089\""));

    cli()
        .arg("--config")
        .arg(&path)
        .args(["config", "--init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

// ── --verbose flag ──

#[test]
fn cli_verbose_flag_accepted() {
    cli().args(["-v", "check", "clear()"]).assert().success();
}

// ── send ──

#[test]
fn cli_send_delivers_datagram() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let to = receiver.local_addr().unwrap().to_string();

    cli()
        .args(["send", "fill(0x00FF00)", "--to", &to])
        .assert()
        .success();

    let mut buf = [0u8; 64];
    let (len, _) = receiver.recv_from(&mut buf).unwrap();
    assert_eq!(&buf[..len], b"fill(0x00FF00)");
}

#[test]
fn cli_send_refuses_invalid_command() {
    cli()
        .args(["send", "fill(red)", "--to", "127.0.0.1:9"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid color"));
}

// ── serve ──

#[test]
fn cli_serve_fails_on_invalid_settings() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path(), r#"{"brightness": 999}"#);
    cli()
        .arg("--config")
        .arg(&config)
        .arg("serve")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("brightness"));
}

#[test]
fn cli_serve_help_succeeds() {
    cli()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Listen"));
}
