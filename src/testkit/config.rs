//! Canonical test configurations.
//!
//! Single source of truth for the TOML used across tests, so each test
//! module does not grow its own slightly-different config.

use std::fmt::Write as _;
use std::path::Path;

use crate::infrastructure::config::settings::Config;

struct SourceEntry {
    name: String,
    dir: String,
    format: String,
    cost: u32,
    quota: Option<u32>,
}

struct CategoryEntry {
    name: String,
    ttl_secs: u64,
    sources: Vec<String>,
}

/// Fluent builder for configuration TOML.
///
/// Sources read from directories given as paths; they are written as TOML
/// literal strings so Windows separators survive.
pub struct ConfigToml {
    min_edge: String,
    timeout_secs: u64,
    poll_interval_secs: u64,
    sources: Vec<SourceEntry>,
    categories: Vec<CategoryEntry>,
}

impl Default for ConfigToml {
    fn default() -> Self {
        Self {
            min_edge: "0.0".into(),
            timeout_secs: 5,
            poll_interval_secs: 60,
            sources: Vec::new(),
            categories: Vec::new(),
        }
    }
}

impl ConfigToml {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_edge(mut self, min_edge: &str) -> Self {
        self.min_edge = min_edge.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Unlimited source of cost 1.
    pub fn source(self, name: &str, dir: &Path, format: &str) -> Self {
        self.source_with(name, dir, format, 1, None)
    }

    /// Source with a monthly quota of `limit`.
    pub fn limited_source(self, name: &str, dir: &Path, format: &str, limit: u32) -> Self {
        self.source_with(name, dir, format, 1, Some(limit))
    }

    pub fn source_with(
        mut self,
        name: &str,
        dir: &Path,
        format: &str,
        cost: u32,
        quota: Option<u32>,
    ) -> Self {
        self.sources.push(SourceEntry {
            name: name.into(),
            dir: dir.display().to_string(),
            format: format.into(),
            cost,
            quota,
        });
        self
    }

    pub fn category(mut self, name: &str, ttl_secs: u64, sources: &[&str]) -> Self {
        self.categories.push(CategoryEntry {
            name: name.into(),
            ttl_secs,
            sources: sources.iter().map(|s| (*s).to_string()).collect(),
        });
        self
    }

    /// Render the TOML document.
    pub fn build(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "[detector]\nmin_edge = {}\n", self.min_edge);
        let _ = writeln!(
            out,
            "[refresh]\ntimeout_secs = {}\npoll_interval_secs = {}\n",
            self.timeout_secs, self.poll_interval_secs
        );

        for source in &self.sources {
            let _ = writeln!(
                out,
                "[[sources]]\nname = \"{}\"\ndir = '{}'\nformat = \"{}\"\ncost = {}",
                source.name, source.dir, source.format, source.cost
            );
            if let Some(limit) = source.quota {
                let _ = writeln!(out, "\n[sources.quota]\nlimit = {limit}");
            }
            out.push('\n');
        }

        for category in &self.categories {
            let sources = category
                .sources
                .iter()
                .map(|s| format!("\"{s}\""))
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(
                out,
                "[[categories]]\nname = \"{}\"\nttl_secs = {}\nsources = [{}]\n",
                category.name, category.ttl_secs, sources
            );
        }
        out
    }

    /// Parse the rendered TOML, panicking on invalid configurations.
    pub fn parse(&self) -> Config {
        Config::parse_toml(&self.build())
            .unwrap_or_else(|e| panic!("invalid test config: {e}\n{}", self.build()))
    }
}

/// One `nfl_odds` category fed by a `theodds` source reading `dir`.
pub fn odds_only(dir: &Path) -> ConfigToml {
    ConfigToml::new()
        .source("theodds", dir, "theodds")
        .category("nfl_odds", 300, &["theodds"])
}
