//! Ad types.

use crate::catalog::Status;
use crate::ids::{AdId, CategoryId, UserId};
use serde::{Deserialize, Serialize};

/// Ad placement type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AdType {
    /// Ordinary listing.
    #[default]
    Regular,
    /// Paid, highlighted listing.
    Featured,
}

impl AdType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdType::Regular => "regular",
            AdType::Featured => "featured",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "regular" => Some(AdType::Regular),
            "featured" => Some(AdType::Featured),
            _ => None,
        }
    }
}

/// A classified ad.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ad {
    /// Unique ad identifier.
    pub id: AdId,
    /// Category the ad is filed under.
    pub category_id: CategoryId,
    /// User who posted the ad.
    pub owner_id: UserId,
    /// Visibility status.
    #[serde(default)]
    pub status: Status,
    /// Placement type.
    #[serde(default)]
    pub ad_type: AdType,
    /// Unix timestamp of creation.
    pub created_at: i64,
    /// Unix timestamp of last update.
    #[serde(default)]
    pub updated_at: Option<i64>,
    /// Unix timestamp after which the ad is hidden, when expiry is enabled.
    #[serde(default)]
    pub expires_at: Option<i64>,
    /// Whether the ad is promoted.
    #[serde(default)]
    pub promoted: bool,
    /// Unix timestamp when the promotion ends.
    #[serde(default)]
    pub promoted_expires_at: Option<i64>,
    /// Form responses, opaque to the catalog.
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl Ad {
    /// Create an active regular ad with an empty attribute payload.
    pub fn new(
        id: impl Into<AdId>,
        category_id: impl Into<CategoryId>,
        owner_id: impl Into<UserId>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            category_id: category_id.into(),
            owner_id: owner_id.into(),
            status: Status::Active,
            ad_type: AdType::Regular,
            created_at,
            updated_at: None,
            expires_at: None,
            promoted: false,
            promoted_expires_at: None,
            attributes: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the attribute payload.
    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = attributes;
        self
    }

    /// Set the placement type.
    pub fn with_type(mut self, ad_type: AdType) -> Self {
        self.ad_type = ad_type;
        self
    }

    /// Set the status.
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    /// Set the expiry timestamp.
    pub fn expiring_at(mut self, expires_at: i64) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Promote the ad until the given timestamp.
    pub fn promoted_until(mut self, until: i64) -> Self {
        self.promoted = true;
        self.promoted_expires_at = Some(until);
        self
    }

    /// Check if the ad is active.
    pub fn is_active(&self) -> bool {
        self.status == Status::Active
    }

    /// Check if the ad is still live at `now` under expiry rules.
    ///
    /// A running promotion or an unexpired ad expiry keeps it visible.
    pub fn is_unexpired_at(&self, now: i64) -> bool {
        let promotion_running =
            self.promoted && self.promoted_expires_at.map_or(false, |until| until >= now);
        let not_expired = self.expires_at.map_or(false, |until| until >= now);
        promotion_running || not_expired
    }

    /// The `price` attribute, if present and numeric.
    pub fn price(&self) -> Option<f64> {
        match self.attributes.get("price")? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Case-insensitive substring search over the string attributes.
    pub fn mentions(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        needle.is_empty() || value_mentions(&self.attributes, &needle)
    }
}

fn value_mentions(value: &serde_json::Value, needle: &str) -> bool {
    match value {
        serde_json::Value::String(s) => s.to_lowercase().contains(needle),
        serde_json::Value::Array(items) => items.iter().any(|v| value_mentions(v, needle)),
        serde_json::Value::Object(map) => map.values().any(|v| value_mentions(v, needle)),
        _ => false,
    }
}

/// Input for posting an ad.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewAd {
    /// Explicit ID; generated when absent.
    #[serde(default)]
    pub id: Option<AdId>,
    /// Category to file the ad under.
    pub category_id: CategoryId,
    /// Placement type.
    #[serde(default)]
    pub ad_type: AdType,
    /// Form responses.
    #[serde(default)]
    pub attributes: serde_json::Value,
    /// Promotion end, if the ad is promoted.
    #[serde(default)]
    pub promoted_until: Option<i64>,
}

impl NewAd {
    pub fn new(category_id: impl Into<CategoryId>) -> Self {
        Self {
            id: None,
            category_id: category_id.into(),
            ad_type: AdType::Regular,
            attributes: serde_json::Value::Object(serde_json::Map::new()),
            promoted_until: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<AdId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_type(mut self, ad_type: AdType) -> Self {
        self.ad_type = ad_type;
        self
    }

    pub fn promoted_until(mut self, until: i64) -> Self {
        self.promoted_until = Some(until);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_price_from_payload() {
        let ad = Ad::new("a1", "cars", "u1", 0).with_attributes(json!({"price": 1200}));
        assert_eq!(ad.price(), Some(1200.0));

        let ad = Ad::new("a2", "cars", "u1", 0).with_attributes(json!({"price": " 99.5 "}));
        assert_eq!(ad.price(), Some(99.5));

        let ad = Ad::new("a3", "cars", "u1", 0).with_attributes(json!({"price": "call me"}));
        assert_eq!(ad.price(), None);
        assert_eq!(Ad::new("a4", "cars", "u1", 0).price(), None);
    }

    #[test]
    fn test_mentions_nested_strings() {
        let ad = Ad::new("a1", "cars", "u1", 0).with_attributes(json!({
            "title": "Toyota Corolla",
            "details": {"colors": ["Red", "Silver"]},
            "year": 2015
        }));

        assert!(ad.mentions("corolla"));
        assert!(ad.mentions("SILVER"));
        assert!(ad.mentions(""));
        assert!(!ad.mentions("2015"));
        assert!(!ad.mentions("honda"));
    }

    #[test]
    fn test_expiry_visibility() {
        let now = 1_000;
        let plain = Ad::new("a1", "cars", "u1", 0);
        assert!(!plain.is_unexpired_at(now));

        assert!(plain.clone().expiring_at(now).is_unexpired_at(now));
        assert!(!plain.clone().expiring_at(now - 1).is_unexpired_at(now));
        assert!(plain.clone().promoted_until(now + 10).is_unexpired_at(now));
        assert!(!plain.promoted_until(now - 10).is_unexpired_at(now));
    }

    #[test]
    fn test_ad_deserializes_with_defaults() {
        let ad: Ad = serde_json::from_value(json!({
            "id": "a1",
            "category_id": "cars",
            "owner_id": "u1",
            "created_at": 10
        }))
        .unwrap();

        assert!(ad.is_active());
        assert_eq!(ad.ad_type, AdType::Regular);
        assert!(!ad.promoted);
        assert!(ad.attributes.is_null());
    }
}
