//! Ad query builder.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::catalog::{Ad, CategoryTree};
use crate::ids::AdId;
use crate::ranking::TrendingRanker;
use crate::search::{AdFilter, Pagination};
use serde::{Deserialize, Serialize};

/// Sort options for ad lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdSort {
    /// Newest first.
    #[default]
    CreatedDesc,
    /// Oldest first.
    CreatedAsc,
    /// Cheapest first; unpriced ads last.
    PriceAsc,
    /// Most expensive first; unpriced ads last.
    PriceDesc,
    /// Highest trending factor first.
    Trending,
}

impl AdSort {
    /// Parse a `field`/`direction` pair such as `("price", "asc")`.
    ///
    /// Any direction other than `asc` sorts descending.
    pub fn from_field(field: &str, direction: &str) -> Option<Self> {
        let ascending = direction.eq_ignore_ascii_case("asc");
        match field {
            "created_at" if ascending => Some(AdSort::CreatedAsc),
            "created_at" => Some(AdSort::CreatedDesc),
            "price" if ascending => Some(AdSort::PriceAsc),
            "price" => Some(AdSort::PriceDesc),
            "trending" => Some(AdSort::Trending),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AdSort::CreatedDesc => "Newest",
            AdSort::CreatedAsc => "Oldest",
            AdSort::PriceAsc => "Price: Low to High",
            AdSort::PriceDesc => "Price: High to Low",
            AdSort::Trending => "Trending",
        }
    }

    /// Order ads. The sort is stable.
    ///
    /// `ranker`, `favorite_counts` and `now` are only consulted for
    /// [`AdSort::Trending`].
    pub fn sort<'a>(
        &self,
        mut ads: Vec<&'a Ad>,
        ranker: &TrendingRanker,
        favorite_counts: &HashMap<AdId, u64>,
        now: i64,
    ) -> Vec<&'a Ad> {
        match self {
            AdSort::CreatedDesc => ads.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            AdSort::CreatedAsc => ads.sort_by_key(|ad| ad.created_at),
            AdSort::PriceAsc => ads.sort_by(|a, b| compare_prices(a, b, false)),
            AdSort::PriceDesc => ads.sort_by(|a, b| compare_prices(a, b, true)),
            AdSort::Trending => {
                return ranker
                    .rank(ads, favorite_counts, now)
                    .into_iter()
                    .map(|ranked| ranked.ad)
                    .collect();
            }
        }
        ads
    }
}

fn compare_prices(a: &Ad, b: &Ad, descending: bool) -> Ordering {
    match (a.price(), b.price()) {
        (Some(x), Some(y)) if descending => y.total_cmp(&x),
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// An ad query: filters, sort order and page window.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AdQuery {
    /// Filters to apply, all of which must match.
    #[serde(default)]
    pub filters: Vec<AdFilter>,
    /// Sort option.
    #[serde(default)]
    pub sort: AdSort,
    /// Page window.
    #[serde(default)]
    pub pagination: Pagination,
}

impl AdQuery {
    /// Create a query with no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text search over the attribute payload. Blank text is ignored.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        if !text.trim().is_empty() {
            self.filters.push(AdFilter::Text(text));
        }
        self
    }

    /// Add a filter.
    pub fn with_filter(mut self, filter: AdFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set sort option.
    pub fn with_sort(mut self, sort: AdSort) -> Self {
        self.sort = sort;
        self
    }

    /// Set the page window.
    pub fn with_pagination(mut self, limit: usize, offset: usize) -> Self {
        self.pagination = Pagination::new(limit, offset);
        self
    }

    /// Check whether an ad passes every filter.
    pub fn matches(&self, ad: &Ad, tree: &CategoryTree) -> bool {
        self.filters.iter().all(|filter| filter.matches(ad, tree))
    }

    /// Keep the ads passing every filter, in input order.
    pub fn select<'a>(
        &self,
        tree: &CategoryTree,
        ads: impl IntoIterator<Item = &'a Ad>,
    ) -> Vec<&'a Ad> {
        ads.into_iter().filter(|ad| self.matches(ad, tree)).collect()
    }
}
