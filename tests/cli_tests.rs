//! The binary, driven as a subprocess.

mod support;

use std::path::Path;
use std::process::{Command, Output};

use serde_json::{json, Value};
use tempfile::TempDir;

use sharpline::infrastructure::config::settings::{MIN_EDGE_ENV, POLL_INTERVAL_ENV};
use sharpline::testkit::config::{odds_only, ConfigToml};

use support::snapshot::{arbitrage_game, fair_game, write};

fn sharpline(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sharpline"))
        .args(args)
        .current_dir(cwd)
        .env_remove(MIN_EDGE_ENV)
        .env_remove(POLL_INTERVAL_ENV)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("stdout is not JSON ({e}):\n{stdout}"))
}

fn workspace() -> (TempDir, String) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "nfl_odds", &json!([arbitrage_game("g1"), fair_game("g2")]));
    let config = odds_only(dir.path()).min_edge("0.01").build();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, config).unwrap();
    (dir, path.display().to_string())
}

#[test]
fn odds_converts_negative_american() {
    let dir = tempfile::tempdir().unwrap();

    let output = sharpline(dir.path(), &["--json", "odds", "-110"]);

    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["command"], "odds");
    assert_eq!(body["implied_probability"], "0.5238");
}

#[test]
fn quiet_odds_prints_only_the_number() {
    let dir = tempfile::tempdir().unwrap();

    let output = sharpline(dir.path(), &["-q", "odds", "+150"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().starts_with("0.4"), "{stdout}");
    assert_eq!(stdout.lines().count(), 1);
}

#[test]
fn zero_odds_exit_nonzero() {
    let dir = tempfile::tempdir().unwrap();

    let output = sharpline(dir.path(), &["odds", "0"]);

    assert!(!output.status.success());
    assert!(!output.stderr.is_empty());
}

#[test]
fn scan_reports_arbitrage_as_json() {
    let (dir, config) = workspace();

    let output = sharpline(dir.path(), &["--json", "scan", "-c", &config]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let body = stdout_json(&output);
    assert_eq!(body["command"], "scan");
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories.len(), 1);
    let nfl = &categories[0];
    assert_eq!(nfl["category"], "nfl_odds");
    assert_eq!(nfl["status"]["events"], 2);
    let opportunities = nfl["opportunities"].as_array().unwrap();
    assert_eq!(opportunities.len(), 1);
    assert_eq!(opportunities[0]["event_id"], "g1");
    assert_eq!(opportunities[0]["kind"], "cross_venue_arbitrage");
}

#[test]
fn scan_of_unknown_category_fails() {
    let (dir, config) = workspace();

    let output = sharpline(dir.path(), &["scan", "-c", &config, "--category", "curling"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("curling"));
}

#[test]
fn scan_without_config_file_fails() {
    let dir = tempfile::tempdir().unwrap();

    let output = sharpline(dir.path(), &["scan"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("config"));
}

#[test]
fn config_validate_accepts_a_good_file() {
    let (dir, config) = workspace();

    let output = sharpline(dir.path(), &["--json", "config", "validate", "-c", &config]);

    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["command"], "config.validate");
    assert_eq!(body["valid"], true);
}

#[test]
fn config_validate_rejects_unknown_source() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let toml = ConfigToml::new()
        .source("theodds", dir.path(), "theodds")
        .category("nfl_odds", 300, &["missing"])
        .build();
    std::fs::write(&path, toml).unwrap();

    let output = sharpline(dir.path(), &["config", "validate"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("missing"));
}

#[test]
fn config_show_lists_categories() {
    let (dir, config) = workspace();

    let output = sharpline(dir.path(), &["--json", "config", "show", "-c", &config]);

    assert!(output.status.success());
    let body = stdout_json(&output);
    assert_eq!(body["config"]["categories"][0]["name"], "nfl_odds");
    assert_eq!(body["config"]["sources"][0]["format"], "theodds");
}
