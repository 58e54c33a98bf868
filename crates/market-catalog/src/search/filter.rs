//! Ad filter types.

use crate::catalog::{Ad, CategoryTree, Status};
use crate::ids::{CategoryId, CountryId, UserId};
use serde::{Deserialize, Serialize};

/// A filter over ads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AdFilter {
    /// Ads whose category belongs to a country.
    Country(CountryId),
    /// Ads filed under a category or any of its descendants.
    Category(CategoryId),
    /// Ads with a status.
    Status(Status),
    /// Ads posted by a user.
    Owner(UserId),
    /// Ads with a running promotion or an unexpired expiry at `now`.
    Unexpired { now: i64 },
    /// Case-insensitive search over the attribute payload.
    Text(String),
    /// Ads whose `price` attribute lies in a range. Ads without a price never match.
    PriceRange { min: Option<f64>, max: Option<f64> },
    /// Only promoted ads.
    Promoted,
}

impl AdFilter {
    /// Create a category subtree filter.
    pub fn category(id: impl Into<CategoryId>) -> Self {
        AdFilter::Category(id.into())
    }

    /// Create a country filter.
    pub fn country(id: impl Into<CountryId>) -> Self {
        AdFilter::Country(id.into())
    }

    /// Create an owner filter.
    pub fn owner(id: impl Into<UserId>) -> Self {
        AdFilter::Owner(id.into())
    }

    /// Only active ads.
    pub fn active() -> Self {
        AdFilter::Status(Status::Active)
    }

    /// Create a text search filter.
    pub fn text(query: impl Into<String>) -> Self {
        AdFilter::Text(query.into())
    }

    /// Create a price range filter.
    pub fn price_range(min: Option<f64>, max: Option<f64>) -> Self {
        AdFilter::PriceRange { min, max }
    }

    /// Check whether an ad passes the filter.
    ///
    /// Country and category filters never match ads whose category is
    /// missing from the tree.
    pub fn matches(&self, ad: &Ad, tree: &CategoryTree) -> bool {
        match self {
            AdFilter::Country(country) => tree
                .get(&ad.category_id)
                .map_or(false, |c| &c.country_id == country),
            AdFilter::Category(root) => tree.is_in_subtree(&ad.category_id, root),
            AdFilter::Status(status) => &ad.status == status,
            AdFilter::Owner(owner) => &ad.owner_id == owner,
            AdFilter::Unexpired { now } => ad.is_unexpired_at(*now),
            AdFilter::Text(query) => ad.mentions(query),
            AdFilter::PriceRange { min, max } => match ad.price() {
                Some(price) => {
                    min.map_or(true, |min| price >= min) && max.map_or(true, |max| price <= max)
                }
                None => false,
            },
            AdFilter::Promoted => ad.promoted,
        }
    }
}
