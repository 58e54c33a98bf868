//! Snapshot files: a JSON dump of categories, ads and favorites.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context as _, Result};
use market_catalog::config::MarketConfig;
use market_catalog::prelude::*;
use market_catalog::store::FAVORITES;
use serde::{Deserialize, Serialize};

/// Marketplace contents loaded by the CLI.
///
/// Categories carry only their links; the closure is rebuilt on load.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub categories: Vec<NewCategory>,
    #[serde(default)]
    pub ads: Vec<Ad>,
    #[serde(default)]
    pub favorites: Vec<Favorite>,
}

impl Snapshot {
    /// Read a snapshot from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse snapshot: {}", path.display()))
    }

    /// Categories reordered so every parent comes before its children.
    fn ordered_categories(&self) -> Result<Vec<NewCategory>> {
        let mut pending: Vec<&NewCategory> = self.categories.iter().collect();
        let mut placed: HashSet<&CategoryId> = HashSet::new();
        let mut ordered = Vec::with_capacity(pending.len());

        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|&category| {
                let ready = category
                    .parent_id
                    .as_ref()
                    .map_or(true, |parent| placed.contains(parent));
                if ready {
                    if let Some(id) = &category.id {
                        placed.insert(id);
                    }
                    ordered.push(category.clone());
                }
                !ready
            });

            if pending.len() == before {
                let orphans: Vec<String> = pending
                    .iter()
                    .map(|c| c.id.as_ref().map_or_else(|| c.name.clone(), |id| id.to_string()))
                    .collect();
                bail!(
                    "Categories with unknown or cyclic parents: {}",
                    orphans.join(", ")
                );
            }
        }

        Ok(ordered)
    }

    /// Build a marketplace holding the snapshot contents.
    pub fn into_marketplace(self, config: MarketConfig) -> Result<Marketplace> {
        let market = Marketplace::new(config);

        for category in self.ordered_categories()? {
            let name = category.name.clone();
            market
                .create_category(category)
                .with_context(|| format!("Failed to create category '{}'", name))?;
        }

        let tree = market.tree()?;
        let known: HashSet<&AdId> = self.ads.iter().map(|ad| &ad.id).collect();
        for ad in &self.ads {
            tree.require(&ad.category_id)
                .with_context(|| format!("Ad {} is filed under an unknown category", ad.id))?;
        }
        for favorite in &self.favorites {
            if !known.contains(&favorite.ad_id) {
                bail!("Favorite of {} points at unknown ad {}", favorite.user_id, favorite.ad_id);
            }
        }
        drop(tree);

        market.store().transaction(|tx| {
            for ad in &self.ads {
                CatalogStore::insert_ad(tx, ad)?;
            }
            for favorite in &self.favorites {
                tx.upsert(FAVORITES, &favorite.key(), favorite)?;
            }
            Ok(())
        })?;

        Ok(market)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Snapshot {
        serde_json::from_value(json!({
            "categories": [
                {"id": "cars", "name": "Cars", "country_id": "et", "parent_id": "vehicles"},
                {"id": "vehicles", "name": "Vehicles", "country_id": "et"},
                {"id": "bikes", "name": "Bikes", "country_id": "et", "parent_id": "vehicles"}
            ],
            "ads": [
                {"id": "ad-1", "category_id": "cars", "owner_id": "u1", "created_at": 100,
                 "attributes": {"title": "Corolla", "price": 9000}},
                {"id": "ad-2", "category_id": "bikes", "owner_id": "u2", "created_at": 200}
            ],
            "favorites": [
                {"user_id": "u3", "ad_id": "ad-1"}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_parents_load_first() {
        let ordered = sample().ordered_categories().unwrap();
        let ids: Vec<_> = ordered
            .iter()
            .map(|c| c.id.as_ref().unwrap().as_str())
            .collect();
        assert_eq!(ids, vec!["vehicles", "bikes", "cars"]);
    }

    #[test]
    fn test_into_marketplace() {
        let market = sample().into_marketplace(MarketConfig::default()).unwrap();
        let tree = market.tree().unwrap();
        tree.validate().unwrap();
        assert_eq!(tree.get(&CategoryId::new("cars")).unwrap().level, 2);
        drop(tree);

        assert_eq!(market.ad(&AdId::new("ad-1")).unwrap().created_at, 100);
        assert!(market
            .store()
            .is_favorite(&UserId::new("u3"), &AdId::new("ad-1"))
            .unwrap());
        let lca = market
            .lca_of(&[AdId::new("ad-1"), AdId::new("ad-2")])
            .unwrap()
            .unwrap();
        assert_eq!(lca.id.as_str(), "vehicles");
    }

    #[test]
    fn test_orphan_category_rejected() {
        let mut snapshot = sample();
        snapshot.categories.push(NewCategory::new("Lost", "et").with_id("lost").with_parent("nowhere"));
        let err = snapshot.ordered_categories().unwrap_err();
        assert!(err.to_string().contains("lost"));
    }

    #[test]
    fn test_ad_in_unknown_category_rejected() {
        let mut snapshot = sample();
        snapshot.ads.push(Ad::new("ad-3", "boats", "u1", 0));
        assert!(snapshot.into_marketplace(MarketConfig::default()).is_err());
    }
}
