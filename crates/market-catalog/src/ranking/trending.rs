//! Trending score blending recency and popularity.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::Ad;
use crate::config::RankingConfig;
use crate::ids::AdId;

/// Default weight of the recency signal.
pub const DEFAULT_RECENCY_WEIGHT: f64 = 0.3;

/// Default weight of the favorites signal.
pub const DEFAULT_POPULARITY_WEIGHT: f64 = 0.6;

/// Score breakdown for one ad.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingScore {
    pub ad_id: AdId,
    pub favorite_count: u64,
    /// Seconds since creation, clamped at zero.
    pub duration: i64,
    pub duration_factor: f64,
    pub fav_factor: f64,
    pub trending_factor: f64,
}

/// An ad with its trending score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedAd<'a> {
    pub ad: &'a Ad,
    pub score: TrendingScore,
}

/// Ranks ads by a weighted sum of recency and favorite count.
///
/// Both signals are normalized against the batch: the newest ad gets a
/// `duration_factor` of 1.0 and the most favorited ad a `fav_factor` of 1.0.
/// All durations are measured from the same `now`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendingRanker {
    recency_weight: f64,
    popularity_weight: f64,
}

impl Default for TrendingRanker {
    fn default() -> Self {
        Self::new(DEFAULT_RECENCY_WEIGHT, DEFAULT_POPULARITY_WEIGHT)
    }
}

impl TrendingRanker {
    pub fn new(recency_weight: f64, popularity_weight: f64) -> Self {
        Self {
            recency_weight,
            popularity_weight,
        }
    }

    pub fn from_config(config: &RankingConfig) -> Self {
        Self::new(config.recency_weight, config.popularity_weight)
    }

    /// Score every ad, in input order.
    pub fn score<'a>(
        &self,
        ads: impl IntoIterator<Item = &'a Ad>,
        favorite_counts: &HashMap<AdId, u64>,
        now: i64,
    ) -> Vec<TrendingScore> {
        let ads: Vec<&Ad> = ads.into_iter().collect();
        let durations: Vec<i64> = ads.iter().map(|ad| (now - ad.created_at).max(0)).collect();
        let min_duration = durations.iter().copied().min().unwrap_or(0);
        let counts: Vec<u64> = ads
            .iter()
            .map(|ad| favorite_counts.get(&ad.id).copied().unwrap_or(0))
            .collect();
        let max_favorite = counts.iter().copied().max().unwrap_or(0);

        ads.iter()
            .zip(durations)
            .zip(counts)
            .map(|((ad, duration), favorite_count)| {
                let duration_factor = if duration <= 0 {
                    1.0
                } else {
                    min_duration as f64 / duration as f64
                };
                let fav_factor = favorite_count as f64 / max_favorite.max(1) as f64;
                TrendingScore {
                    ad_id: ad.id.clone(),
                    favorite_count,
                    duration,
                    duration_factor,
                    fav_factor,
                    trending_factor: duration_factor * self.recency_weight
                        + fav_factor * self.popularity_weight,
                }
            })
            .collect()
    }

    /// Rank ads by descending trending factor. Ties keep input order.
    pub fn rank<'a>(
        &self,
        ads: impl IntoIterator<Item = &'a Ad>,
        favorite_counts: &HashMap<AdId, u64>,
        now: i64,
    ) -> Vec<RankedAd<'a>> {
        let ads: Vec<&'a Ad> = ads.into_iter().collect();
        let scores = self.score(ads.iter().copied(), favorite_counts, now);
        let mut ranked: Vec<RankedAd<'a>> = ads
            .into_iter()
            .zip(scores)
            .map(|(ad, score)| RankedAd { ad, score })
            .collect();
        ranked.sort_by(|a, b| b.score.trending_factor.total_cmp(&a.score.trending_factor));
        ranked
    }
}
