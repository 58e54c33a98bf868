//! Similar ads by walking up the category tree.

use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::{Ad, CategoryTree};
use crate::error::CatalogError;
use crate::ids::AdId;

/// Default number of similar ads returned.
pub const DEFAULT_SIMILAR_LIMIT: usize = 5;

/// An ad suggested next to a reference ad.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarAd<'a> {
    pub ad: &'a Ad,
    /// Level distance between the category the ad was found through and the
    /// reference ad's category.
    pub diff: i32,
}

/// Find up to `limit` ads similar to `reference` among `candidates`.
///
/// Ads filed directly in the reference category come first with `diff == 0`.
/// The search then widens one level at a time: at each step every ad below
/// the current category is added, tagged with the level distance from the
/// reference category. The first step runs on the reference category itself,
/// so its whole subtree is also at `diff == 0`. The walk stops once `limit`
/// ads are collected or the root is passed. Results are ordered by `diff`,
/// keeping candidate order for ties.
///
/// The reference ad is never returned. Candidates filed under categories
/// missing from the tree are skipped.
pub fn similar_ads<'a>(
    tree: &CategoryTree,
    reference: &Ad,
    candidates: &'a [Ad],
    limit: usize,
) -> Result<Vec<SimilarAd<'a>>, CatalogError> {
    let origin = tree.require(&reference.category_id)?;

    let mut similar: Vec<SimilarAd<'a>> = Vec::new();
    let mut seen: HashSet<&AdId> = HashSet::new();
    seen.insert(&reference.id);

    for ad in candidates {
        if ad.category_id == origin.id && seen.insert(&ad.id) {
            similar.push(SimilarAd { ad, diff: 0 });
        }
    }

    let mut current = origin;
    loop {
        let diff = (current.level - origin.level).abs();
        for ad in candidates {
            let below = tree
                .get(&ad.category_id)
                .map_or(false, |c| c.ancestors.contains(&current.id));
            if below && seen.insert(&ad.id) {
                similar.push(SimilarAd { ad, diff });
            }
        }

        if similar.len() >= limit {
            break;
        }
        match tree.parent_of(&current.id) {
            Some(parent) => current = parent,
            None => break,
        }
    }

    similar.sort_by_key(|s| s.diff);
    similar.truncate(limit);
    Ok(similar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NewCategory;

    /// vehicles -> cars -> {sedans, suvs}, vehicles -> bikes, property
    fn tree() -> CategoryTree {
        let mut tree = CategoryTree::new();
        for (id, parent) in [
            ("vehicles", None),
            ("cars", Some("vehicles")),
            ("sedans", Some("cars")),
            ("suvs", Some("cars")),
            ("bikes", Some("vehicles")),
            ("property", None),
        ] {
            let mut new = NewCategory::new(id, "et").with_id(id);
            if let Some(parent) = parent {
                new = new.with_parent(parent);
            }
            tree.create_category(new).unwrap();
        }
        tree
    }

    fn ad(id: &str, category: &str) -> Ad {
        Ad::new(id, category, "owner", 0)
    }

    #[test]
    fn test_crowded_category_fills_at_diff_zero() {
        let tree = tree();
        let mut ads = vec![ad("ref", "sedans")];
        for i in 0..7 {
            ads.push(ad(&format!("peer-{}", i), "sedans"));
        }
        ads.push(ad("suv", "suvs"));

        let similar = similar_ads(&tree, &ads[0], &ads, 5).unwrap();
        assert_eq!(similar.len(), 5);
        assert!(similar.iter().all(|s| s.diff == 0));
        assert!(similar.iter().all(|s| s.ad.id.as_str() != "ref"));
    }

    #[test]
    fn test_widens_to_parent_level() {
        let tree = tree();
        let mut ads = vec![ad("ref", "sedans"), ad("peer-1", "sedans"), ad("peer-2", "sedans")];
        for i in 0..10 {
            ads.push(ad(&format!("suv-{}", i), "suvs"));
        }

        let similar = similar_ads(&tree, &ads[0], &ads, 5).unwrap();
        assert_eq!(similar.len(), 5);
        assert_eq!(similar[0].diff, 0);
        assert_eq!(similar[1].diff, 0);
        let peers: HashSet<&str> = similar[..2].iter().map(|s| s.ad.id.as_str()).collect();
        assert_eq!(peers, HashSet::from(["peer-1", "peer-2"]));
        assert!(similar[2..].iter().all(|s| s.diff == 1));
    }

    #[test]
    fn test_root_exhausted_returns_what_was_found() {
        let tree = tree();
        let ads = vec![
            ad("ref", "sedans"),
            ad("suv", "suvs"),
            ad("bike", "bikes"),
            ad("house", "property"),
        ];

        let similar = similar_ads(&tree, &ads[0], &ads, 5).unwrap();
        let found: Vec<(&str, i32)> = similar.iter().map(|s| (s.ad.id.as_str(), s.diff)).collect();
        assert_eq!(found, vec![("suv", 1), ("bike", 2)]);
    }

    #[test]
    fn test_subtree_of_reference_is_diff_zero() {
        let tree = tree();
        let ads = vec![ad("ref", "cars"), ad("sedan", "sedans"), ad("bike", "bikes")];

        let similar = similar_ads(&tree, &ads[0], &ads, 5).unwrap();
        let found: Vec<(&str, i32)> = similar.iter().map(|s| (s.ad.id.as_str(), s.diff)).collect();
        assert_eq!(found, vec![("sedan", 0), ("bike", 1)]);
    }

    #[test]
    fn test_missing_reference_category() {
        let tree = tree();
        let ads = vec![ad("ref", "ghost")];
        let err = similar_ads(&tree, &ads[0], &ads, 5).unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(_)));
    }
}
