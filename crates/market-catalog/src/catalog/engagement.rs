//! User engagement records: favorites, reports and category filter history.

use std::collections::HashMap;

use crate::ids::{AdId, CategoryId, ReportId, UserId};
use serde::{Deserialize, Serialize};

/// Longest accepted report description, in characters.
pub const MAX_REPORT_DESCRIPTION: usize = 250;

/// A user's favorite ad. At most one per (user, ad) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Favorite {
    pub user_id: UserId,
    pub ad_id: AdId,
    #[serde(default)]
    pub created_at: i64,
}

impl Favorite {
    pub fn new(user_id: impl Into<UserId>, ad_id: impl Into<AdId>, created_at: i64) -> Self {
        Self {
            user_id: user_id.into(),
            ad_id: ad_id.into(),
            created_at,
        }
    }

    /// Storage key, unique per (user, ad) pair.
    pub fn key(&self) -> String {
        pair_key(&self.user_id, &self.ad_id)
    }
}

/// Storage key for records unique per (user, ad) pair.
///
/// The user ID is length-prefixed so IDs containing `:` cannot collide.
pub(crate) fn pair_key(user_id: &UserId, ad_id: &AdId) -> String {
    format!("{}:{}:{}", user_id.as_str().len(), user_id, ad_id)
}

/// Outcome of toggling a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteToggle {
    Added,
    Removed,
}

impl FavoriteToggle {
    /// Message shown to the user.
    pub fn message(&self) -> &'static str {
        match self {
            FavoriteToggle::Added => "Ad has been added to favorites",
            FavoriteToggle::Removed => "Ad has been removed from favorites",
        }
    }
}

/// Count favorites per ad.
pub fn favorite_counts<'a>(favorites: impl IntoIterator<Item = &'a Favorite>) -> HashMap<AdId, u64> {
    let mut counts = HashMap::new();
    for favorite in favorites {
        *counts.entry(favorite.ad_id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Why an ad was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportCategory {
    #[default]
    Fraud,
    Spam,
    Inappropriate,
    Duplicate,
    Other,
}

impl ReportCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportCategory::Fraud => "fraud",
            ReportCategory::Spam => "spam",
            ReportCategory::Inappropriate => "inappropriate",
            ReportCategory::Duplicate => "duplicate",
            ReportCategory::Other => "other",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "fraud" => Some(ReportCategory::Fraud),
            "spam" => Some(ReportCategory::Spam),
            "inappropriate" => Some(ReportCategory::Inappropriate),
            "duplicate" => Some(ReportCategory::Duplicate),
            "other" => Some(ReportCategory::Other),
            _ => None,
        }
    }
}

/// A user's report against an ad. At most one per (user, ad) pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub id: ReportId,
    pub ad_id: AdId,
    /// The reporting user.
    pub user_id: UserId,
    #[serde(default)]
    pub category: ReportCategory,
    pub description: String,
    pub created_at: i64,
}

impl Report {
    pub fn key(&self) -> String {
        pair_key(&self.user_id, &self.ad_id)
    }
}

/// A record that a user browsed a category, kept for recommendations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserCategoryFilter {
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorite_counts() {
        let favorites = vec![
            Favorite::new("u1", "a1", 0),
            Favorite::new("u2", "a1", 0),
            Favorite::new("u1", "a2", 0),
        ];
        let counts = favorite_counts(&favorites);

        assert_eq!(counts.get(&AdId::new("a1")), Some(&2));
        assert_eq!(counts.get(&AdId::new("a2")), Some(&1));
        assert_eq!(counts.get(&AdId::new("a3")), None);
    }

    #[test]
    fn test_pair_keys() {
        let favorite = Favorite::new("u1", "a1", 0);
        assert_eq!(favorite.key(), "2:u1:a1");
    }

    #[test]
    fn test_pair_keys_with_colons_stay_distinct() {
        let first = pair_key(&UserId::new("u:1"), &AdId::new("x"));
        let second = pair_key(&UserId::new("u"), &AdId::new("1:x"));
        assert_ne!(first, second);
    }

    #[test]
    fn test_report_category_names() {
        assert_eq!(ReportCategory::default(), ReportCategory::Fraud);
        assert_eq!(ReportCategory::from_str("SPAM"), Some(ReportCategory::Spam));
        assert_eq!(ReportCategory::Other.as_str(), "other");
        assert_eq!(ReportCategory::from_str("rude"), None);
    }
}
