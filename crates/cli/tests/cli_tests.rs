//! CLI integration tests

use serde_json::{json, Value};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::{NamedTempFile, TempDir};

/// Run the binary with an isolated home directory
fn carecast(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_carecast"))
        .args(args)
        .env("HOME", home)
        .env_remove("CARECAST_API_URL")
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute carecast")
}

fn log_file(logs: &Value) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", logs).unwrap();
    file
}

fn worked_example() -> Value {
    json!([
        {"checkin_date": "2024-05-01", "severity_rating": 3, "nap_count": 1, "is_emergency": false},
        {"checkin_date": "2024-05-02", "severity_rating": 4, "nap_count": 1, "is_emergency": false},
        {"checkin_date": "2024-05-03", "severity_rating": 5, "nap_count": 1, "is_emergency": false},
        {"checkin_date": "2024-05-04", "severity_rating": 9, "nap_count": 1, "is_emergency": true}
    ])
}

#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    let output = carecast(home.path(), &["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("Carecast"), "Should show app name");
    assert!(stdout.contains("predict"), "Should show predict command");
    assert!(stdout.contains("health"), "Should show health command");
}

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    let output = carecast(home.path(), &["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("carecast"), "Should show binary name");
}

#[test]
fn test_predict_help_lists_options() {
    let home = TempDir::new().unwrap();
    let output = carecast(home.path(), &["predict", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("--strategy"));
    assert!(stdout.contains("--remote"));
}

#[test]
fn test_predict_local_json() {
    let home = TempDir::new().unwrap();
    let file = log_file(&worked_example());
    let path = file.path().to_str().unwrap();

    let output = carecast(home.path(), &["--format", "json", "predict", path]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["predicted_severity"].as_f64(), Some(11.0));
    assert_eq!(result["risk_level"], "High");
}

#[test]
fn test_predict_local_table() {
    let home = TempDir::new().unwrap();
    let file = log_file(&worked_example());

    let output = carecast(home.path(), &["predict", file.path().to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("11.0"));
    assert!(stdout.contains("High"));
}

#[test]
fn test_predict_short_history_shows_fallback() {
    let home = TempDir::new().unwrap();
    let file = log_file(&json!([{"checkin_date": "2024-05-01", "severity_rating": 8}]));

    let output = carecast(
        home.path(),
        &["--format", "json", "predict", "--strategy", "linear", file.path().to_str().unwrap()],
    );
    assert!(output.status.success());

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["predicted_severity"].as_f64(), Some(5.0));
    assert_eq!(result["recommendation"], "Start logging daily to see AI insights.");
}

#[test]
fn test_predict_malformed_record_fails() {
    let home = TempDir::new().unwrap();
    let file = log_file(&json!([
        {"checkin_date": "2024-05-01", "severity_rating": 3, "nap_count": 1, "is_emergency": false},
        {"checkin_date": "2024-05-02", "severity_rating": 4, "is_emergency": false}
    ]));

    let output = carecast(home.path(), &["predict", file.path().to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("nap_count"), "stderr: {}", stderr);
}

#[test]
fn test_predict_unknown_strategy_fails() {
    let home = TempDir::new().unwrap();
    let file = log_file(&worked_example());

    let output = carecast(
        home.path(),
        &["predict", "--strategy", "crystal_ball", file.path().to_str().unwrap()],
    );
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("crystal_ball"));
}

#[test]
fn test_predict_missing_file_fails() {
    let home = TempDir::new().unwrap();
    let output = carecast(home.path(), &["predict", "/nonexistent/carecast/logs.json"]);
    assert!(!output.status.success());
}

#[test]
fn test_user_config_supplies_default_format() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config").join("carecast");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(
        config_dir.join("config.json"),
        r#"{"default_format": "json", "default_strategy": "trend"}"#,
    )
    .unwrap();
    let file = log_file(&worked_example());

    let output = carecast(home.path(), &["predict", file.path().to_str().unwrap()]);
    assert!(output.status.success());

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["risk_level"], "High");
}

#[test]
fn test_predict_remote_posts_to_service() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/predict")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "predicted_severity": 6.5,
                "risk_level": "Moderate",
                "recommendation": "Severity is expected to rise slightly."
            })
            .to_string(),
        )
        .create();
    let file = log_file(&worked_example());
    let url = server.url();

    let output = carecast(
        home.path(),
        &["--api-url", &url, "--format", "json", "predict", "--remote", file.path().to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    mock.assert();

    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["risk_level"], "Moderate");
}

#[test]
fn test_health_table() {
    let home = TempDir::new().unwrap();
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/healthz")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "status": "degraded",
                "components": {
                    "validator": {
                        "status": "degraded",
                        "message": "record 0: expected an object",
                        "last_check_timestamp": 1714521600
                    },
                    "forecaster": {"status": "healthy", "last_check_timestamp": 1714521600}
                }
            })
            .to_string(),
        )
        .create();
    let url = server.url();

    let output = carecast(home.path(), &["--api-url", &url, "health"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("degraded"));
    assert!(stdout.contains("validator"));
    assert!(stdout.contains("expected an object"));
}
