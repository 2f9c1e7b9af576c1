//! Shared helper routines for operator implementations.

use crate::domain::Category;
use crate::error::{RefreshError, Result};
use crate::infrastructure::config::catalog::SourceConfig;
use crate::infrastructure::config::settings::Config;

/// Resolve the categories a request targets, in configuration order.
pub(super) fn target_categories(config: &Config, only: Option<&str>) -> Result<Vec<Category>> {
    match only {
        Some(name) => {
            let name = name.trim();
            if config.categories.iter().any(|c| c.name == name) {
                Ok(vec![Category::from(name)])
            } else {
                Err(RefreshError::UnknownCategory {
                    category: name.to_string(),
                }
                .into())
            }
        }
        None => Ok(config
            .categories
            .iter()
            .map(|c| Category::from(c.name.as_str()))
            .collect()),
    }
}

/// `"<limit>/<window>"` for a limited source.
pub(super) fn quota_label(source: &SourceConfig) -> Option<String> {
    let quota = source.quota.as_ref()?;
    let window = quota
        .window()
        .map_or_else(|| "unbounded".to_string(), |w| w.to_string());
    Some(format!("{}/{}", quota.limit, window))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const TOML: &str = r#"
[[sources]]
name = "odds"
dir = "data"
format = "theodds"

[sources.quota]
limit = 500

[[categories]]
name = "nfl"
sources = ["odds"]

[[categories]]
name = "nba"
sources = ["odds"]
"#;

    #[test]
    fn targets_every_category_in_order() {
        let config = Config::parse_toml(TOML).unwrap();
        let targets = target_categories(&config, None).unwrap();
        assert_eq!(targets, vec![Category::from("nfl"), Category::from("nba")]);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let config = Config::parse_toml(TOML).unwrap();
        let err = target_categories(&config, Some("mlb")).unwrap_err();
        assert!(matches!(
            err,
            Error::Refresh(RefreshError::UnknownCategory { .. })
        ));
    }

    #[test]
    fn quota_label_shows_limit_and_window() {
        let config = Config::parse_toml(TOML).unwrap();
        assert_eq!(quota_label(&config.sources[0]).as_deref(), Some("500/month"));
    }
}
