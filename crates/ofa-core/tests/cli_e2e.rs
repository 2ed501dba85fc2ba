//! CLI E2E tests for the `ofa` binary.
//!
//! Validates:
//! - `etl` builds the processed tables and reports counts
//! - `metrics` JSON carries every section, honours filters and marks the
//!   payment breakdown as global
//! - `abtest` and `export` read the processed tables
//! - Missing inputs and missing tables map to stable exit codes

mod common;

use std::path::Path;
use std::time::Duration;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// Helpers
// ============================================================================

/// Command for the `ofa` binary rooted at `root`, isolated from any user
/// config file.
fn ofa(root: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("ofa");
    cmd.timeout(Duration::from_secs(60))
        .env("XDG_CONFIG_HOME", root.join("xdg"))
        .env("HOME", root)
        .env_remove("OFA_CONFIG")
        .env_remove("OFA_RAW_DIR")
        .env_remove("OFA_PROCESSED_DIR")
        .env_remove("RUST_LOG")
        .arg("--raw-dir")
        .arg(root.join("raw"))
        .arg("--processed-dir")
        .arg(root.join("processed"));
    cmd
}

fn json_of(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).expect("parse JSON")
}

fn prepared() -> TempDir {
    let tmp = TempDir::new().unwrap();
    common::write_sample_raw(&tmp.path().join("raw"));
    ofa(tmp.path()).arg("etl").assert().success();
    tmp
}

// ============================================================================
// ETL
// ============================================================================

#[test]
fn test_etl_json_summary() {
    let tmp = TempDir::new().unwrap();
    common::write_sample_raw(&tmp.path().join("raw"));

    let json = json_of(ofa(tmp.path()).args(["--format", "json", "etl"]));
    assert_eq!(json["master_rows"], 4);
    assert!(json["run_id"].as_str().unwrap().starts_with("run-"));
    assert_eq!(json["outputs"].as_array().unwrap().len(), 3);
    assert!(tmp.path().join("processed/orders_master.parquet").exists());
}

#[test]
fn test_etl_missing_input_exit_code() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("raw")).unwrap();

    ofa(tmp.path())
        .arg("etl")
        .assert()
        .code(11)
        .stderr(predicate::str::contains("missing input"));
}

#[test]
fn test_etl_missing_input_json_error() {
    let tmp = TempDir::new().unwrap();
    std::fs::create_dir_all(tmp.path().join("raw")).unwrap();

    let output = ofa(tmp.path())
        .args(["--format", "json", "etl"])
        .assert()
        .code(11)
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&output).expect("parse JSON");
    assert_eq!(json["error"]["code"], 20);
}

// ============================================================================
// Metrics
// ============================================================================

#[test]
fn test_metrics_json_sections() {
    let tmp = prepared();
    let json = json_of(ofa(tmp.path()).args(["--format", "json", "metrics"]));

    assert_eq!(json["orders"], 4);
    assert_eq!(json["funnel_counts"]["created"], 1);
    assert_eq!(json["funnel_counts"]["delivered_customer"], 2);
    assert_eq!(json["funnel_conversion"]["steps"].as_array().unwrap().len(), 3);
    assert_eq!(json["payment_breakdown_scope"], "global");
    assert_eq!(json["payment_breakdown"]["status"], "present");
    assert_eq!(json["top_categories"]["status"], "present");
    assert!(json["weekly_kpis"].as_array().unwrap().len() >= 3);
    assert_eq!(json["sla_days"].as_array().unwrap().len(), 2);
}

#[test]
fn test_metrics_state_filter() {
    let tmp = prepared();
    let json = json_of(ofa(tmp.path()).args(["--format", "json", "metrics", "--state", "RJ"]));

    assert_eq!(json["orders"], 1);
    assert_eq!(json["funnel_counts"]["delivered_carrier"], 1);
    // Payments stay dataset-wide under a row filter.
    assert_eq!(json["payment_breakdown"]["rows"].as_array().unwrap().len(), 3);
}

#[test]
fn test_metrics_week_filter_and_top_geo() {
    let tmp = prepared();
    let json = json_of(ofa(tmp.path()).args([
        "--format",
        "json",
        "metrics",
        "--from",
        "2017-11-13",
        "--to",
        "2017-11-20",
        "--top-geo",
        "1",
    ]));
    assert_eq!(json["orders"], 2);
    assert!(json["top_geo"].as_array().unwrap().len() <= 1);
}

#[test]
fn test_metrics_summary_output() {
    let tmp = prepared();
    ofa(tmp.path())
        .arg("metrics")
        .assert()
        .success()
        .stdout(predicate::str::contains("Funnel"))
        .stdout(predicate::str::contains("Payments (global)"));
}

#[test]
fn test_metrics_without_etl_exit_code() {
    let tmp = TempDir::new().unwrap();
    ofa(tmp.path())
        .arg("metrics")
        .assert()
        .code(12)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_metrics_rejects_bad_date() {
    let tmp = TempDir::new().unwrap();
    ofa(tmp.path())
        .args(["metrics", "--from", "yesterday"])
        .assert()
        .code(2);
}

// ============================================================================
// A/B readout, export and config
// ============================================================================

#[test]
fn test_abtest_json() {
    let tmp = prepared();
    let json = json_of(ofa(tmp.path()).args(["--format", "json", "abtest"]));
    let n = json["a"]["n"].as_u64().unwrap() + json["b"]["n"].as_u64().unwrap();
    assert_eq!(n, 4);
    let p = json["p_value"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&p));
}

#[test]
fn test_export_writes_csv_files() {
    let tmp = prepared();
    let out = tmp.path().join("csv");
    ofa(tmp.path())
        .arg("export")
        .arg("--out-dir")
        .arg(&out)
        .assert()
        .success();
    for name in ["orders_master.csv", "weekly_kpis.csv", "geo_delivered.csv"] {
        assert!(out.join(name).exists(), "{name} missing");
    }
}

#[test]
fn test_invalid_config_exit_code() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("ofa.toml");
    std::fs::write(&path, "[metrics]\ntop_geo = 0\n").unwrap();
    ofa(tmp.path())
        .arg("--config")
        .arg(&path)
        .arg("config")
        .assert()
        .code(10);
}

#[test]
fn test_config_reflects_flags() {
    let tmp = TempDir::new().unwrap();
    let json = json_of(ofa(tmp.path()).args(["--format", "json", "config"]));
    let raw = json["paths"]["raw_dir"].as_str().unwrap();
    assert!(raw.ends_with("raw"));
    assert_eq!(json["metrics"]["top_geo"], 10);
}
