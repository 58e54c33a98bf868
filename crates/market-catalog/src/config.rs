//! Marketplace configuration.

use market_observability::{LogFormat, LogLevel};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Top-level marketplace configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MarketConfig {
    /// Ranking knobs.
    #[serde(default)]
    pub ranking: RankingConfig,

    /// Moderation rules.
    #[serde(default)]
    pub moderation: ModerationConfig,

    /// Ad lifetime preferences.
    #[serde(default)]
    pub preferences: AdPreferences,

    /// Logging setup.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MarketConfig {
    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), CatalogError> {
        self.ranking.validate()?;
        if self.moderation.report_threshold == 0 {
            return Err(CatalogError::ValidationError(
                "moderation.report_threshold must be at least 1".to_string(),
            ));
        }
        if !(0..=MAX_AD_EXPIRY_DAYS).contains(&self.preferences.ad_expiry_days) {
            return Err(CatalogError::ValidationError(format!(
                "preferences.ad_expiry_days must be between 0 and {}",
                MAX_AD_EXPIRY_DAYS
            )));
        }
        Ok(())
    }
}

/// Ranking configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankingConfig {
    /// Maximum number of similar ads returned.
    #[serde(default = "default_similar_limit")]
    pub similar_limit: usize,

    /// Weight of the recency signal in the trending score.
    #[serde(default = "default_recency_weight")]
    pub recency_weight: f64,

    /// Weight of the favorites signal in the trending score.
    #[serde(default = "default_popularity_weight")]
    pub popularity_weight: f64,
}

fn default_similar_limit() -> usize {
    5
}

fn default_recency_weight() -> f64 {
    0.3
}

fn default_popularity_weight() -> f64 {
    0.6
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            similar_limit: default_similar_limit(),
            recency_weight: default_recency_weight(),
            popularity_weight: default_popularity_weight(),
        }
    }
}

impl RankingConfig {
    fn validate(&self) -> Result<(), CatalogError> {
        for (name, weight) in [
            ("ranking.recency_weight", self.recency_weight),
            ("ranking.popularity_weight", self.popularity_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(CatalogError::ValidationError(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// Moderation configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModerationConfig {
    /// Number of reports that deactivates an ad.
    #[serde(default = "default_report_threshold")]
    pub report_threshold: usize,
}

fn default_report_threshold() -> usize {
    3
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            report_threshold: default_report_threshold(),
        }
    }
}

/// Longest accepted ad lifetime, in days.
pub const MAX_AD_EXPIRY_DAYS: i64 = 36_500;

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Ad lifetime preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdPreferences {
    /// Hide ads whose expiry (or promotion) has passed.
    #[serde(default)]
    pub ad_expiry_enabled: bool,

    /// Days a new ad stays live when expiry is enabled.
    #[serde(default)]
    pub ad_expiry_days: i64,
}

impl AdPreferences {
    /// Expiry timestamp for an ad posted at `created_at`, if expiry is on.
    ///
    /// Saturates at `i64::MAX` instead of overflowing.
    pub fn expiry_for(&self, created_at: i64) -> Option<i64> {
        self.ad_expiry_enabled.then(|| {
            created_at.saturating_add(self.ad_expiry_days.saturating_mul(SECONDS_PER_DAY))
        })
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Minimum level.
    #[serde(default)]
    pub level: LogLevel,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MarketConfig::default();
        assert_eq!(config.ranking.similar_limit, 5);
        assert_eq!(config.ranking.recency_weight, 0.3);
        assert_eq!(config.ranking.popularity_weight, 0.6);
        assert_eq!(config.moderation.report_threshold, 3);
        assert!(!config.preferences.ad_expiry_enabled);
        assert_eq!(config.logging.level, LogLevel::Info);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: MarketConfig = serde_json::from_str(
            r#"{"ranking": {"similar_limit": 8}, "preferences": {"ad_expiry_enabled": true, "ad_expiry_days": 30}}"#,
        )
        .unwrap();

        assert_eq!(config.ranking.similar_limit, 8);
        assert_eq!(config.ranking.popularity_weight, 0.6);
        assert_eq!(config.moderation.report_threshold, 3);
        assert_eq!(config.preferences.expiry_for(100), Some(100 + 30 * 86_400));
    }

    #[test]
    fn test_expiry_disabled() {
        assert_eq!(AdPreferences::default().expiry_for(100), None);
    }

    #[test]
    fn test_huge_expiry_saturates() {
        let preferences = AdPreferences {
            ad_expiry_enabled: true,
            ad_expiry_days: i64::MAX,
        };
        assert_eq!(preferences.expiry_for(1_000), Some(i64::MAX));

        let mut config = MarketConfig::default();
        config.preferences = preferences;
        assert!(config.validate().is_err());

        config.preferences.ad_expiry_days = MAX_AD_EXPIRY_DAYS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = MarketConfig::default();
        config.moderation.report_threshold = 0;
        assert!(config.validate().is_err());

        let mut config = MarketConfig::default();
        config.ranking.recency_weight = f64::NAN;
        assert!(config.validate().is_err());
    }
}
