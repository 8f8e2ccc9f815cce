//! The binary prints the generic error record whenever a remote call fails

use std::process::{Command, Output};

use serde_json::Value;

/// Base URL on a port nothing listens on
fn refused_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/v1", addr)
}

fn run_cli(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_flag-detector"))
        .args(args)
        .env("FLAG_DETECTOR_ENV_FILE", "does-not-exist.env")
        .env("FLAG_DETECTOR_CONFIG", "does-not-exist.toml")
        .env("FLAG_DETECTOR_API_KEY", "sk-test")
        .env("FLAG_DETECTOR_BASE_URL", refused_base_url())
        .env("FLAG_DETECTOR_TIMEOUT_MS", "5000")
        .env_remove("FLAG_DETECTOR_FALLBACK")
        .env_remove("FLAG_DETECTOR_MODEL")
        .env_remove("FLAG_DETECTOR_CONFIDENCE_FLOOR")
        .env("RUST_LOG", "off")
        .output()
        .unwrap()
}

fn assert_error_record(report: &Value) {
    assert_eq!(report["result"]["label"], "Analysis Error");
    assert_eq!(report["result"]["confidence"], 0);
    assert_eq!(report["result"]["category"], "System");
}

#[test]
fn classify_failure_prints_error_record() {
    let output = run_cli(&["classify", "he reads my messages"]);
    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["input"], "he reads my messages");
    assert_error_record(&report);
}

#[test]
fn batch_failure_prints_error_record_per_input() {
    let output = run_cli(&["batch", "he reads my messages", "  ", "she listens"]);
    assert!(!output.status.success());
    let reports: Value = serde_json::from_slice(&output.stdout).unwrap();
    let reports = reports.as_array().unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["input"], "he reads my messages");
    assert_eq!(reports[1]["input"], "she listens");
    for report in reports {
        assert_error_record(report);
    }
}

#[test]
fn analyze_failure_prints_error_record() {
    let output = run_cli(&["analyze", "we never talk about money", "--type", "communication"]);
    assert!(!output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["input"], "we never talk about money");
    assert_error_record(&report);
}

#[test]
fn local_needs_no_network() {
    let output = run_cli(&["local", "he always checks my phone"]);
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["result"]["category"], "Jealousy");
    assert_eq!(report["source"], "local");
}
