//! CLI smoke tests for the eventflow-server binary
//!
//! These tests verify that the CLI commands work correctly, including
//! configuration validation, help output, and basic command functionality.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::time::timeout;

/// Helper to run the eventflow-server binary with given arguments
fn run_eventflow_server(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_eventflow-server"))
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute eventflow-server")
}

/// Helper to run the eventflow-server binary with timeout
async fn run_eventflow_server_with_timeout(
    args: &[&str],
    timeout_duration: Duration,
) -> Result<std::process::Output, Box<dyn std::error::Error>> {
    let mut cmd = tokio::process::Command::new(env!("CARGO_BIN_EXE_eventflow-server"));
    cmd.args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    match timeout(timeout_duration, cmd.output()).await {
        Ok(result) => result.map_err(|e| e.into()),
        Err(elapsed) => Err(elapsed.into()),
    }
}

/// Write `body` below a `server` section rooted in `home`.
fn write_config(home: &Path, name: &str, port: u16, body: &str) -> String {
    let path = home.join(name);
    let content = format!(
        "server:\n  home_dir: \"{}\"\n  host: \"127.0.0.1\"\n  port: {port}\n{body}",
        home.display()
    );
    std::fs::write(&path, content).expect("Failed to write config file");
    path.to_string_lossy().to_string()
}

const LOGGING: &str = r#"
logging:
  default:
    console_level: info
    file: "logs/eventflow.log"
    file_level: info
    max_age_days: 28
    max_backups: 3
    max_size_mb: 100
"#;

#[test]
fn test_cli_help_command() {
    let output = run_eventflow_server(&["--help"]);

    assert!(output.status.success(), "Help command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("eventflow-server") || stdout.contains("EventFlow"),
        "Should contain binary name"
    );
    assert!(
        stdout.contains("Usage:") || stdout.contains("USAGE:"),
        "Should contain usage information"
    );
    assert!(stdout.contains("run"), "Should contain 'run' subcommand");
    assert!(stdout.contains("check"), "Should contain 'check' subcommand");
    assert!(stdout.contains("--config"), "Should mention config option");
}

#[test]
fn test_cli_version_command() {
    let output = run_eventflow_server(&["--version"]);

    assert!(output.status.success(), "Version command should succeed");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("eventflow-server"));
    assert!(stdout.chars().any(|c| c.is_ascii_digit()));
}

#[test]
fn test_cli_invalid_command() {
    let output = run_eventflow_server(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("unrecognized"),
        "Should contain error message about invalid command"
    );
}

#[test]
fn test_cli_config_validation_missing_file() {
    let output = run_eventflow_server(&["--config", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success(), "Should fail with missing config");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("config file not found"),
        "Should mention config file issue: {stderr}"
    );
}

#[test]
fn test_cli_config_flag_short_form() {
    let output = run_eventflow_server(&["-c", "/nonexistent/config.yaml", "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("config file not found"), "{stderr}");
}

#[test]
fn test_cli_config_validation_invalid_yaml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_path = temp_dir.path().join("invalid.yaml");
    std::fs::write(&config_path, "invalid: yaml: content: [unclosed")
        .expect("Failed to write file");

    let output = run_eventflow_server(&["--config", config_path.to_str().unwrap(), "check"]);

    assert!(!output.status.success(), "Should fail with invalid YAML");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid yaml config"), "{stderr}");
}

#[test]
fn test_cli_config_validation_valid_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = format!(
        "{LOGGING}
modules:
  marketplace:
    jwt_secret: \"smoke-test-secret\"
    seed_demo_data: false
"
    );
    let config = write_config(temp_dir.path(), "valid.yaml", 8081, &body);

    let output = run_eventflow_server(&["--config", &config, "check"]);

    if !output.status.success() {
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
        eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
    }
    assert!(output.status.success(), "Should succeed with valid config");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Configuration check passed"), "{stdout}");
    assert!(stdout.contains("smoke-test-secret"), "{stdout}");
}

#[test]
fn test_cli_check_base_url_follows_ingress_port() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = r#"
modules:
  api_ingress:
    bind_addr: "127.0.0.1:9123"
  marketplace:
    seed_demo_data: false
"#;
    let config = write_config(temp_dir.path(), "ingress-port.yaml", 8086, body);

    let output = run_eventflow_server(&["--config", &config, "check"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Public base URL: http://localhost:9123"),
        "{stdout}"
    );
}

#[test]
fn test_cli_check_rejects_bad_public_base_url() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = r#"
modules:
  marketplace:
    public_base_url: "ftp://eventflow.test"
"#;
    let config = write_config(temp_dir.path(), "bad-url.yaml", 8082, body);

    let output = run_eventflow_server(&["--config", &config, "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("public_base_url"), "{stderr}");
}

#[test]
fn test_cli_check_rejects_unknown_ingress_keys() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = r#"
modules:
  api_ingress:
    listen_on: "0.0.0.0:80"
"#;
    let config = write_config(temp_dir.path(), "unknown.yaml", 8083, body);

    let output = run_eventflow_server(&["--config", &config, "check"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("api_ingress"), "{stderr}");
}

#[test]
fn test_cli_run_command_invalid_bind_address() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = r#"
modules:
  api_ingress:
    bind_addr: "not-an-address"
"#;
    let config = write_config(temp_dir.path(), "bind.yaml", 8084, body);

    let output = run_eventflow_server(&["--config", &config, "run"]);

    assert!(!output.status.success(), "Should fail with invalid bind address");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid bind address"), "{stderr}");
}

#[tokio::test]
async fn test_cli_run_command_starts_server() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let body = format!(
        "{LOGGING}
modules:
  marketplace:
    jwt_secret: \"smoke-test-secret\"
"
    );
    let config = write_config(temp_dir.path(), "run.yaml", 0, &body);

    let result =
        run_eventflow_server_with_timeout(&["--config", &config, "run"], Duration::from_secs(10))
            .await;

    match result {
        // Still serving when the timeout fired.
        Err(err) => assert!(err.to_string().contains("elapsed"), "{err}"),
        Ok(output) => {
            eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
            eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
            panic!("server exited early with {:?}", output.status);
        }
    }

    // Startup seeded the data directory under home_dir.
    assert!(temp_dir.path().join("data").join("users.json").is_file());
}

#[test]
fn test_cli_print_config_applies_port_override() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(temp_dir.path(), "print.yaml", 8085, "");

    let output = run_eventflow_server(&["--config", &config, "--port", "9099", "--print-config"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("port: 9099"), "{stdout}");
}

#[test]
fn test_cli_verbose_flag() {
    let output = run_eventflow_server(&["--verbose", "--help"]);

    assert!(output.status.success(), "Verbose help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:") || stdout.contains("USAGE:"));
}

#[test]
fn test_cli_subcommand_help() {
    let output = run_eventflow_server(&["run", "--help"]);
    assert!(output.status.success(), "Run subcommand help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("server"));

    let output = run_eventflow_server(&["check", "--help"]);
    assert!(output.status.success(), "Check subcommand help should succeed");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("configuration"));
}
