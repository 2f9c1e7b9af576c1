//! Terminal output for CLI handlers.
//!
//! Every printer honours two global switches set once from the CLI flags:
//! `--json` turns each line into a `{"type": .., "payload": ..}` object on
//! stdout, and `--quiet` suppresses everything except warnings, errors and
//! command results.

use std::fmt::Display;
use std::sync::{OnceLock, RwLock};

use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use serde_json::json;

/// Runtime output configuration shared by CLI handlers.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    /// Emit machine-readable JSON output instead of human-readable text.
    pub json: bool,
    /// Suppress non-essential output.
    pub quiet: bool,
    /// Verbosity level (0 = normal, 1+ = increasingly verbose).
    pub verbose: u8,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool, verbose: u8) -> Self {
        Self {
            json,
            quiet,
            verbose,
        }
    }
}

static OUTPUT_CONFIG: OnceLock<RwLock<OutputConfig>> = OnceLock::new();

fn config_cell() -> &'static RwLock<OutputConfig> {
    OUTPUT_CONFIG.get_or_init(|| RwLock::new(OutputConfig::default()))
}

fn read_config() -> OutputConfig {
    match config_cell().read() {
        Ok(config) => *config,
        Err(poisoned) => *poisoned.into_inner(),
    }
}

fn write_config(config: OutputConfig) {
    match config_cell().write() {
        Ok(mut current) => *current = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

fn suppressed(config: OutputConfig) -> bool {
    !config.json && config.quiet
}

fn emit_json_line(kind: &str, payload: serde_json::Value) {
    println!(
        "{}",
        json!({
            "type": kind,
            "payload": payload,
        })
    );
}

/// Apply output settings from global CLI flags.
///
/// Call this early in the CLI entry point.
pub fn configure(config: OutputConfig) {
    write_config(config);
}

#[must_use]
pub fn is_json() -> bool {
    read_config().json
}

#[must_use]
pub fn is_quiet() -> bool {
    read_config().quiet
}

/// Number of `-v` flags given.
#[must_use]
pub fn verbosity() -> u8 {
    read_config().verbose
}

/// Print the application name and version.
pub fn header(version: &str) {
    let config = read_config();
    if config.json {
        emit_json_line(
            "header",
            json!({
                "app": "sharpline",
                "version": version,
            }),
        );
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("{} {}", "sharpline".bold(), version.dimmed());
    println!();
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let config = read_config();
    let value = value.to_string();

    if config.json {
        emit_json_line(
            "field",
            json!({
                "label": label,
                "value": value,
            }),
        );
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {:<14} {}", label.dimmed(), value);
}

pub fn success(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("success", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {} {}", "✓".green(), message);
}

/// Print a warning line. Shown even in quiet mode.
pub fn warning(message: &str) {
    if read_config().json {
        emit_json_line("warning", json!({ "message": message }));
        return;
    }

    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if read_config().json {
        eprintln!(
            "{}",
            json!({
                "type": "error",
                "payload": { "message": message },
            })
        );
        return;
    }

    eprintln!("  {} {}", "×".red(), message);
}

pub fn section(title: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("section", json!({ "title": title }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!();
    println!("{}", title.bold());
}

pub fn note(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("note", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {}", message.dimmed());
}

/// Print a hint with a `hint:` prefix.
pub fn hint(message: &str) {
    let config = read_config();

    if config.json {
        emit_json_line("hint", json!({ "message": message }));
        return;
    }
    if suppressed(config) {
        return;
    }

    println!("  {}: {}", "hint".cyan().dimmed(), message.dimmed());
}

/// Print pre-rendered content such as a table, each line indented.
pub fn lines(content: &str) {
    if suppressed(read_config()) {
        return;
    }

    for line in content.lines() {
        println!("  {line}");
    }
}

/// Emit a JSON document as the command result.
pub fn json_output(value: serde_json::Value) {
    println!("{value}");
}

#[must_use]
pub fn highlight(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.cyan())
}

#[must_use]
pub fn muted(value: impl Display) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    format!("{}", value.dimmed())
}

/// Render a fraction as a percentage with two decimals, e.g. `0.0523` as
/// `5.23%`.
#[must_use]
pub fn percent(fraction: Decimal) -> String {
    format!("{:.2}%", (fraction * Decimal::ONE_HUNDRED).round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn percent_rounds_to_two_places() {
        assert_eq!(percent(dec!(0.0523)), "5.23%");
        assert_eq!(percent(dec!(0.05)), "5.00%");
        assert_eq!(percent(dec!(0.123456)), "12.35%");
        assert_eq!(percent(Decimal::ZERO), "0.00%");
    }

    #[test]
    fn quiet_suppresses_only_without_json() {
        assert!(suppressed(OutputConfig::new(false, true, 0)));
        assert!(!suppressed(OutputConfig::new(true, true, 0)));
        assert!(!suppressed(OutputConfig::new(false, false, 2)));
    }
}
