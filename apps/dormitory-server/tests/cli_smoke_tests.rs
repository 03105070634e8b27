//! CLI smoke tests for the dormitory-server binary

use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

/// Run the binary with HOME pointed at `home` so nothing leaks into the real home dir.
fn run_server(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dormitory-server"))
        .args(args)
        .env("HOME", home)
        .env("APPDATA", home)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute dormitory-server")
}

fn write_config(dir: &TempDir, extra: &str) -> String {
    let home = dir.path().join("home").to_string_lossy().replace('\\', "/");
    let yaml = format!(
        r#"
server:
  home_dir: "{home}"
  host: "127.0.0.1"
  port: 18087

database:
  url: "sqlite://database/dormitory.db"

logging:
  default:
    console_level: "warn"
    file: ""
{extra}"#
    );
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, yaml).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn test_cli_help_command() {
    let tmp = TempDir::new().unwrap();
    let output = run_server(tmp.path(), &["--help"]);
    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("dormitory-server"));
    assert!(stdout.contains("Usage:"));
    for sub in ["run", "check", "migrate", "seed", "--config", "--mock"] {
        assert!(stdout.contains(sub), "help should mention {sub}");
    }
}

#[test]
fn test_cli_version_command() {
    let tmp = TempDir::new().unwrap();
    let output = run_server(tmp.path(), &["--version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("0.1.0"));
}

#[test]
fn test_cli_invalid_command() {
    let tmp = TempDir::new().unwrap();
    let output = run_server(tmp.path(), &["invalid-command"]);
    assert!(!output.status.success(), "Invalid command should fail");
}

#[test]
fn test_cli_missing_config_file() {
    let tmp = TempDir::new().unwrap();
    let output = run_server(tmp.path(), &["--config", "/nonexistent/config.yaml", "check"]);
    assert!(!output.status.success(), "Should fail with missing config");
}

#[test]
fn test_cli_invalid_yaml() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.yaml");
    std::fs::write(&path, "server: [unclosed").unwrap();
    let output = run_server(tmp.path(), &["--config", path.to_str().unwrap(), "check"]);
    assert!(!output.status.success(), "Should fail with invalid YAML");
}

#[test]
fn test_cli_check_valid_config() {
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, "modules:\n  dormitory:\n    min_password_length: 8\n");
    let output = run_server(tmp.path(), &["--config", &cfg, "check"]);
    assert!(
        output.status.success(),
        "check failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Configuration check passed"));
}

#[test]
fn test_cli_check_rejects_bad_module_config() {
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, "modules:\n  dormitory:\n    min_pasword_length: 8\n");
    let output = run_server(tmp.path(), &["--config", &cfg, "check"]);
    assert!(!output.status.success());
}

#[test]
fn test_cli_print_config_applies_port_override() {
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, "");
    let output = run_server(tmp.path(), &["--config", &cfg, "--port", "9999", "--print-config"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("port: 9999"));
}

#[test]
fn test_cli_migrate_then_seed_sqlite_file() {
    let tmp = TempDir::new().unwrap();
    let cfg = write_config(&tmp, "");

    let output = run_server(tmp.path(), &["--config", &cfg, "migrate"]);
    assert!(
        output.status.success(),
        "migrate failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(tmp.path().join("home/database/dormitory.db").exists());

    let output = run_server(tmp.path(), &["--config", &cfg, "seed"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Demo data loaded"));

    let output = run_server(tmp.path(), &["--config", &cfg, "seed"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("nothing seeded"));
}
