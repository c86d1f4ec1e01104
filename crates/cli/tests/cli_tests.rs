//! CLI integration tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const COSTS: &str = r#"{
    "items": [
        {"timestamp": "2025-01-30T00:00:00Z", "cpuCountOnDemand": 10, "totalCpuCostOnDemand": 100,
         "cpuOverprovisioningOnDemandPercent": 50, "cpuUsedOnDemand": 4},
        {"timestamp": "2025-01-31T00:00:00Z", "cpuCountOnDemand": "10", "totalCpuCostOnDemand": "100",
         "cpuOverprovisioningOnDemandPercent": 40, "cpuUsedOnDemand": 5},
        {"timestamp": "2025-02-01T00:00:00Z", "cpuCountOnDemand": 10, "totalCpuCostOnDemand": 60,
         "cpuCountSpot": 10, "totalCpuCostSpot": 20, "cpuOverprovisioningOnDemandPercent": 20,
         "cpuUsedOnDemand": 8},
        {"timestamp": "2025-02-02T00:00:00Z", "cpuCountOnDemand": 10, "totalCpuCostOnDemand": 60,
         "cpuCountSpot": 10, "totalCpuCostSpot": 20, "cpuOverprovisioningOnDemandPercent": 10,
         "cpuUsedOnDemand": 9}
    ]
}"#;

fn impact(args: &[&str]) -> Output {
    impact_with_env(args, &[])
}

/// Run with a clean `IMPACT_*` environment plus `env`
fn impact_with_env(args: &[&str], env: &[(&str, &str)]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_impact"));
    for (key, _) in std::env::vars().filter(|(key, _)| key.starts_with("IMPACT_")) {
        command.env_remove(key);
    }
    command
        .args(args)
        .envs(env.iter().copied())
        .output()
        .expect("Failed to execute command")
}

fn write_feed(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write feed");
    path
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("Temp path is not UTF-8")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("stdout should be JSON")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = impact(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("report"), "Should show report command");
    assert!(stdout.contains("rates"), "Should show rates command");
    assert!(stdout.contains("savings"), "Should show savings command");
    assert!(stdout.contains("efficiency"), "Should show efficiency command");
    assert!(stdout.contains("spot"), "Should show spot command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = impact(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("impact"), "Should show binary name");
}

#[test]
fn test_report_json() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", COSTS);

    let output = impact(&[
        "--format",
        "json",
        "report",
        "--costs",
        path_str(&costs),
        "--cutoff",
        "2025-02-01",
        "--now",
        "2025-06-01T00:00:00Z",
    ]);
    assert!(output.status.success(), "report should succeed: {output:?}");

    let json = stdout_json(&output);
    assert_eq!(json["snapshotCount"], 4);
    assert_eq!(json["periods"]["baselineDays"], 2);
    assert_eq!(json["unitRates"]["onDemand"]["cpu"], 10.0);
    // Two automated days at 80 billed against 100 projected
    assert_eq!(json["savings"]["totalSavings"], 40.0);
    assert_eq!(json["spotAdoption"]["currentRate"], 50.0);
}

#[test]
fn test_missing_cutoff_prints_null() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", COSTS);

    let output = impact(&["--format", "json", "spot", "--costs", path_str(&costs)]);
    assert!(output.status.success(), "missing cutoff is not an error");
    assert!(stdout_json(&output).is_null());
}

#[test]
fn test_unavailable_table_warns() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", COSTS);

    let output = impact(&[
        "rates",
        "--costs",
        path_str(&costs),
        "--cutoff",
        "2020-01-01",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("unavailable"), "Should warn: {stdout}");
}

#[test]
fn test_savings_table() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", COSTS);

    let output = impact(&[
        "savings",
        "--costs",
        path_str(&costs),
        "--cutoff",
        "2025-02-01",
        "--now",
        "2025-06-01",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("Monthly Costs"));
    assert!(stdout.contains("2025-02"));
    assert!(stdout.contains("Savings Summary"));
}

#[test]
fn test_efficiency_json() {
    let dir = TempDir::new().unwrap();
    let feed = write_feed(&dir, "efficiency.json", COSTS);

    let output = impact(&[
        "-f",
        "json",
        "efficiency",
        "--efficiency",
        path_str(&feed),
        "--cutoff",
        "2025-02-01",
    ]);
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["overprovisioning"]["baseline"]["cpu"]["onDemand"], 45.0);
    assert_eq!(json["overprovisioning"]["current"]["cpu"]["onDemand"], 15.0);
    assert_eq!(json["utilization"]["current"]["cpu"]["onDemand"], 85.0);
}

#[test]
fn test_config_file_supplies_cutoff() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", COSTS);
    let config = write_feed(&dir, "impact.toml", "cutoff = \"2025-02-01\"\nformat = \"json\"\n");

    let output = impact(&[
        "--config",
        path_str(&config),
        "spot",
        "--costs",
        path_str(&costs),
    ]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_json(&output)["baselineRate"], 0.0);
}

#[test]
fn test_env_supplies_cutoff() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", COSTS);

    let output = impact_with_env(
        &["spot", "--costs", path_str(&costs)],
        &[("IMPACT_CUTOFF", "2025-02-01"), ("IMPACT_FORMAT", "json")],
    );
    assert!(output.status.success(), "{output:?}");

    let json = stdout_json(&output);
    assert_eq!(json["baselineRate"], 0.0);
    assert_eq!(json["currentRate"], 50.0);
}

#[test]
fn test_flag_overrides_env_cutoff() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", COSTS);

    // The env cutoff alone leaves the baseline empty
    let output = impact_with_env(
        &["-f", "json", "spot", "--costs", path_str(&costs), "--cutoff", "2025-02-01"],
        &[("IMPACT_CUTOFF", "2020-01-01")],
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_json(&output)["currentRate"], 50.0);
}

#[test]
fn test_env_overrides_config_file() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", COSTS);
    let config = write_feed(&dir, "impact.toml", "cutoff = \"2020-01-01\"\nformat = \"json\"\n");

    let output = impact_with_env(
        &["--config", path_str(&config), "spot", "--costs", path_str(&costs)],
        &[("IMPACT_CUTOFF", "2025-02-01")],
    );
    assert!(output.status.success(), "{output:?}");
    assert_eq!(stdout_json(&output)["baselineRate"], 0.0);
    assert_eq!(stdout_json(&output)["currentRate"], 50.0);
}

#[test]
fn test_malformed_feed_fails() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", r#"{"records": []}"#);

    let output = impact(&["rates", "--costs", path_str(&costs), "--cutoff", "2025-02-01"]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("items"), "Should name the expected shape: {stderr}");
}

#[test]
fn test_missing_timestamp_fails() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", r#"[{"cpuCountOnDemand": 1}]"#);

    let output = impact(&["spot", "--costs", path_str(&costs)]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(!output.status.success());
    assert!(stderr.contains("timestamp"), "{stderr}");
}

#[test]
fn test_emit_metrics() {
    let dir = TempDir::new().unwrap();
    let costs = write_feed(&dir, "costs.json", COSTS);

    let output = impact(&[
        "--emit-metrics",
        "-f",
        "json",
        "report",
        "--costs",
        path_str(&costs),
        "--cutoff",
        "2025-02-01",
        "--now",
        "2025-06-01",
    ]);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert!(output.status.success());
    assert!(stderr.contains("impact_report_computation_seconds"));
    assert!(stderr.contains("impact_snapshots_analyzed 4"));
}
