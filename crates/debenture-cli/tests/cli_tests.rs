use std::env;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};

fn get_binary_path() -> PathBuf {
    // When running tests via cargo test, CARGO_BIN_EXE_<name> is set
    let path = env::var("CARGO_BIN_EXE_debenture").expect("Could not find binary path via env var");
    PathBuf::from(path)
}

/// Run the binary isolated from the caller's DEBENTURE_* environment
fn run(args: &[&str]) -> Output {
    let mut cmd = Command::new(get_binary_path());
    for (key, _) in env::vars() {
        if key.starts_with("DEBENTURE_") {
            cmd.env_remove(&key);
        }
    }
    cmd.env("RUST_LOG", "off")
        .current_dir(env::temp_dir())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_help_command() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("debenture"));
    assert!(stdout.contains("--network"));
    assert!(stdout.contains("--offline"));
    assert!(stdout.contains("dashboard"));
}

#[test]
fn test_invalid_network_flag() {
    let output = run(&["--network", "invalid_value", "--offline", "dashboard"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid network"));
}

#[test]
fn test_offline_dashboard_json() {
    let output = run(&["--offline", "--format", "json", "dashboard"]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["total_supply"]["ok"], 1_000_000_000_000i64);
    assert_eq!(parsed["total_value_locked"]["ok"], 0);
    assert_eq!(parsed["latest_ipca"]["ok"], 0.0);
}

#[test]
fn test_offline_bond_fields() {
    let output = run(&["--offline", "--format", "json", "bond", "isin", "symbol"]);

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(parsed["isin"]["ok"], "BREMISDEB5H2");
    assert_eq!(parsed["symbol"]["ok"], "BREMIS");
}

#[test]
fn test_offline_view_returns_fixture() {
    let output = run(&[
        "--offline",
        "view",
        "CAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
        "max_total_supply",
    ]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "1000000000000");
}

#[test]
fn test_offline_mint_fails_with_configuration_error() {
    let output = run(&["--offline", "mint"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing configuration"));
}

#[test]
fn test_invalid_typed_argument() {
    let output = run(&["--offline", "view", "CABC", "denomination", "float:1.5"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown argument type"));
}

#[test]
fn test_keygen_json() {
    let output = run(&["--format", "json", "keygen"]);

    assert!(output.status.success());
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(parsed["public_key"].as_str().unwrap().starts_with('G'));
    assert!(parsed["secret_key"].as_str().unwrap().starts_with('S'));
}

#[test]
fn test_config_file_is_read() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "network = \"nowhere\"").unwrap();

    let output = run(&[
        "--config",
        file.path().to_str().unwrap(),
        "--offline",
        "dashboard",
    ]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid network: nowhere"));
}

#[test]
fn test_tx_status_refuses_offline() {
    let output = run(&["--offline", "tx-status", &"ab".repeat(32)]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--offline"));
}
