//! CLI configuration.

use anyhow::{Context, Result};
use market_catalog::config::MarketConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
///
/// The marketplace sections (`[ranking]`, `[moderation]`, `[preferences]`,
/// `[logging]`) sit at the top level next to `snapshot`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CliConfig {
    /// Snapshot file to load.
    #[serde(default = "default_snapshot")]
    pub snapshot: String,

    /// Marketplace configuration.
    #[serde(flatten)]
    pub market: MarketConfig,
}

fn default_snapshot() -> String {
    "catalog.json".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            snapshot: default_snapshot(),
            market: MarketConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(path, &content)
    }

    /// Parse config text; JSON when `path` ends in `.json`, TOML otherwise.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Generate a default market.toml config file.
pub fn generate_default_config(snapshot: &str) -> String {
    format!(
        r#"# Marketplace configuration

snapshot = "{snapshot}"

[ranking]
similar_limit = 5
recency_weight = 0.3
popularity_weight = 0.6

[moderation]
report_threshold = 3

[preferences]
ad_expiry_enabled = false
ad_expiry_days = 30

[logging]
level = "warn"
format = "human"
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use market_observability::{LogFormat, LogLevel};

    #[test]
    fn test_default_config_parses() {
        let config = CliConfig::parse("market.toml", &generate_default_config("ads.json")).unwrap();
        assert_eq!(config.snapshot, "ads.json");
        assert_eq!(config.market.ranking.similar_limit, 5);
        assert_eq!(config.market.preferences.ad_expiry_days, 30);
        assert_eq!(config.market.logging.level, LogLevel::Warn);
        assert_eq!(config.market.logging.format, LogFormat::Human);
        config.market.validate().unwrap();
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = CliConfig::parse("market.toml", "[ranking]\nsimilar_limit = 2\n").unwrap();
        assert_eq!(config.snapshot, "catalog.json");
        assert_eq!(config.market.ranking.similar_limit, 2);
        assert_eq!(config.market.moderation.report_threshold, 3);
    }

    #[test]
    fn test_json_config() {
        let config = CliConfig::parse(
            "market.json",
            r#"{"snapshot": "s.json", "moderation": {"report_threshold": 5}}"#,
        )
        .unwrap();
        assert_eq!(config.snapshot, "s.json");
        assert_eq!(config.market.moderation.report_threshold, 5);
    }

    #[test]
    fn test_bad_config_reports_path() {
        let err = CliConfig::parse("broken.toml", "ranking = [").unwrap_err();
        assert!(format!("{:#}", err).contains("broken.toml"));
    }
}
