//! Ranking module.
//!
//! Provides the lowest common ancestor of an ad set, similar-ad expansion
//! and trending ranking.

mod lca;
mod similar;
mod trending;

pub use lca::{lowest_common_ancestor, lowest_common_category};
pub use similar::{similar_ads, SimilarAd, DEFAULT_SIMILAR_LIMIT};
pub use trending::{
    RankedAd, TrendingRanker, TrendingScore, DEFAULT_POPULARITY_WEIGHT, DEFAULT_RECENCY_WEIGHT,
};
