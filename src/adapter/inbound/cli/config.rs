//! Handler for the `config` command group.

use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::{operator, output};
use crate::error::Result;

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config_toml = operator::read_config_toml(path)?;
    let config = operator::operator()?.show_config(&config_toml)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "config": config,
        }));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Log level", &config.log_level);
    output::field("Log format", &config.log_format);

    output::section("Detection");
    output::field("Min edge", output::percent(config.min_edge));
    output::field("Min value", output::percent(config.min_value));

    output::section("Refresh");
    output::field("Timeout", format!("{}s", config.timeout_secs));
    output::field("Poll interval", format!("{}s", config.poll_interval_secs));

    output::section("Categories");
    if config.categories.is_empty() {
        output::note("(none configured)");
    }
    for category in &config.categories {
        output::field(
            &category.name,
            format!(
                "ttl {}s, sources: {}",
                category.ttl_secs,
                category.sources.join(", ")
            ),
        );
    }

    output::section("Sources");
    for source in &config.sources {
        let quota = source
            .quota
            .clone()
            .unwrap_or_else(|| "unlimited".to_string());
        output::field(
            &source.name,
            format!(
                "{} ({}), cost {}, quota {}",
                source.dir, source.format, source.cost, quota
            ),
        );
    }

    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    let config_toml = operator::read_config_toml(path)?;
    let validation = operator::operator()?.validate_config(&config_toml)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "path": path.display().to_string(),
            "valid": true,
            "warnings": validation.warnings,
        }));
        return Ok(());
    }

    output::section("Config Validation");
    output::field("Path", path.display());
    output::success("Config file is valid");

    if !validation.warnings.is_empty() {
        output::section("Warnings");
        for warning in &validation.warnings {
            output::warning(warning);
        }
    }

    output::hint(&format!(
        "run {} to refresh once",
        output::highlight(format!("sharpline scan -c {}", path.display()))
    ));

    Ok(())
}
