//! Category tree, ranking and filtering for a classifieds marketplace.
//!
//! This crate provides the core of the marketplace:
//!
//! - **Catalog**: Categories with a materialized ancestor/descendant closure, ads, favorites, reports
//! - **Ranking**: Lowest common ancestor of an ad set, similar ads, trending score
//! - **Search**: Ad filters, sorting, limit/offset pages carrying the LCA category
//! - **Service**: The `Marketplace` facade over the row store
//!
//! # Example
//!
//! ```rust,ignore
//! use market_catalog::prelude::*;
//!
//! let market = Marketplace::new(MarketConfig::default());
//!
//! let vehicles = market.create_category(NewCategory::new("Vehicles", "et"))?;
//! let cars = market.create_category(NewCategory::new("Cars", "et").with_parent(vehicles.id.clone()))?;
//!
//! let ad = market.post_ad(
//!     &UserId::new("seller"),
//!     NewAd::new(cars.id.clone()).with_attributes(serde_json::json!({"title": "Corolla", "price": 9000})),
//! )?;
//!
//! let similar = market.similar(&ad.id)?;
//! let trending = market.trending(&Viewer::anonymous(), 10)?;
//! ```

pub mod error;
pub mod ids;

pub mod catalog;
pub mod config;
pub mod ranking;
pub mod search;
pub mod service;
pub mod store;

pub use error::CatalogError;
pub use ids::*;
pub use service::{Marketplace, RelatedAd, TrendingAd, Viewer};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CatalogError;
    pub use crate::ids::*;

    // Catalog
    pub use crate::catalog::{
        Ad, AdType, Category, CategoryTree, CategoryVersion, Favorite, FavoriteToggle, NewAd,
        NewCategory, Report, ReportCategory, Status, TreeEvent, TreeListener,
        UserCategoryFilter,
    };

    // Ranking
    pub use crate::ranking::{
        lowest_common_ancestor, similar_ads, RankedAd, SimilarAd, TrendingRanker, TrendingScore,
    };

    // Search
    pub use crate::search::{AdFilter, AdPage, AdQuery, AdSort, Pagination};

    // Service
    pub use crate::config::{AdPreferences, MarketConfig, ModerationConfig, RankingConfig};
    pub use crate::service::{Marketplace, RelatedAd, TrendingAd, Viewer};
    pub use crate::store::CatalogStore;
}
