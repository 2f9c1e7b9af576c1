//! Configuration operator implementation.

use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::inbound::operator::config::{
    CategoryView, ConfigValidationReport, ConfigView, ConfigurationOperator, SourceView,
};

use super::entry::Operator;
use super::shared;

impl ConfigurationOperator for Operator {
    fn show_config(&self, config_toml: &str) -> Result<ConfigView> {
        let config = Config::parse_toml(config_toml)?;

        Ok(ConfigView {
            log_level: config.logging.level.clone(),
            log_format: config.logging.format.clone(),
            min_edge: config.detector.min_edge,
            min_value: config.detector.min_value,
            timeout_secs: config.refresh.timeout_secs,
            poll_interval_secs: config.refresh.poll_interval_secs,
            categories: config
                .categories
                .iter()
                .map(|c| CategoryView {
                    name: c.name.clone(),
                    ttl_secs: c.ttl_secs,
                    sources: c.sources.clone(),
                })
                .collect(),
            sources: config
                .sources
                .iter()
                .map(|s| SourceView {
                    name: s.name.clone(),
                    dir: s.dir.display().to_string(),
                    format: s.format.to_string(),
                    cost: s.cost,
                    quota: shared::quota_label(s),
                })
                .collect(),
        })
    }

    fn validate_config(&self, config_toml: &str) -> Result<ConfigValidationReport> {
        let config = Config::parse_toml(config_toml)?;
        let mut warnings = Vec::new();

        for source in &config.sources {
            if !source.dir.is_dir() {
                warnings.push(format!(
                    "Source {} directory {} does not exist",
                    source.name,
                    source.dir.display()
                ));
            }
            if source.quota.is_none() {
                warnings.push(format!("Source {} has no quota (unlimited)", source.name));
            }
            if !config.categories.iter().any(|c| c.sources.contains(&source.name)) {
                warnings.push(format!("Source {} is not used by any category", source.name));
            }
        }

        for category in &config.categories {
            if category.ttl_secs < config.refresh.poll_interval_secs {
                warnings.push(format!(
                    "Category {} ttl ({}s) is shorter than the poll interval ({}s)",
                    category.name, category.ttl_secs, config.refresh.poll_interval_secs
                ));
            }
        }

        if config.detector.min_edge.is_zero() {
            warnings.push("min_edge is 0: every book under 100% is reported".to_string());
        }

        Ok(ConfigValidationReport { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toml_with_dir(dir: &str) -> String {
        format!(
            r#"
[detector]
min_edge = 0.01

[refresh]
poll_interval_secs = 60

[[sources]]
name = "odds"
dir = "{dir}"

[sources.quota]
limit = 500

[[categories]]
name = "nfl"
ttl_secs = 300
sources = ["odds"]
"#
        )
    }

    #[test]
    fn show_config_projects_sources() {
        let view = Operator.show_config(&toml_with_dir("data")).unwrap();

        assert_eq!(view.categories.len(), 1);
        assert_eq!(view.sources[0].format, "quotes");
        assert_eq!(view.sources[0].quota.as_deref(), Some("500/month"));
        assert_eq!(view.poll_interval_secs, 60);
    }

    #[test]
    fn clean_config_has_no_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let toml = toml_with_dir(&dir.path().display().to_string().replace('\\', "/"));

        let report = Operator.validate_config(&toml).unwrap();

        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn missing_directory_is_a_warning() {
        let report = Operator
            .validate_config(&toml_with_dir("/nonexistent/sharpline"))
            .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("does not exist"));
    }
}
