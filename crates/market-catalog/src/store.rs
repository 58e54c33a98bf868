//! Persistence of catalog records in the row store.

use std::collections::BTreeSet;

use market_db::{Db, Transaction};

use crate::catalog::{
    pair_key, Ad, Category, CategoryTree, Favorite, Report, UserCategoryFilter,
};
use crate::error::CatalogError;
use crate::ids::{AdId, CategoryId, UserId};

pub const CATEGORIES: &str = "categories";
pub const ADS: &str = "ads";
pub const FAVORITES: &str = "favorites";
pub const REPORTS: &str = "reports";
pub const CATEGORY_FILTERS: &str = "category_filters";

/// Typed access to the catalog tables.
#[derive(Debug, Default)]
pub struct CatalogStore {
    db: Db,
}

impl CatalogStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Open a store over an empty in-memory database.
    pub fn in_memory() -> Self {
        Self::new(Db::open_in_memory())
    }

    /// The underlying database.
    pub fn db(&self) -> &Db {
        &self.db
    }

    /// Run writes atomically.
    pub fn transaction<F, R>(&self, f: F) -> Result<R, CatalogError>
    where
        F: FnOnce(&mut Transaction) -> Result<R, CatalogError>,
    {
        self.db.transaction(f)
    }

    /// Rebuild the category tree from the stored rows.
    pub fn load_tree(&self) -> Result<CategoryTree, CatalogError> {
        let categories: Vec<Category> = self.db.all(CATEGORIES)?;
        CategoryTree::from_categories(categories)
    }

    /// Write the given categories of `tree` inside a transaction.
    pub fn save_categories(
        tx: &mut Transaction,
        tree: &CategoryTree,
        ids: &BTreeSet<CategoryId>,
    ) -> Result<(), CatalogError> {
        for id in ids {
            let category = tree.require(id)?;
            tx.upsert(CATEGORIES, id.as_str(), category)?;
        }
        Ok(())
    }

    pub fn ad(&self, id: &AdId) -> Result<Ad, CatalogError> {
        self.db
            .get(ADS, id.as_str())?
            .ok_or_else(|| CatalogError::AdNotFound(id.to_string()))
    }

    /// All ads, ordered by ID.
    pub fn ads(&self) -> Result<Vec<Ad>, CatalogError> {
        Ok(self.db.all(ADS)?)
    }

    pub fn insert_ad(tx: &mut Transaction, ad: &Ad) -> Result<(), CatalogError> {
        tx.insert(ADS, ad.id.as_str(), ad).map_err(|e| match e {
            market_db::DbError::Conflict { key, .. } => {
                CatalogError::ValidationError(format!("ad {} already exists", key))
            }
            other => other.into(),
        })
    }

    pub fn favorites(&self) -> Result<Vec<Favorite>, CatalogError> {
        Ok(self.db.all(FAVORITES)?)
    }

    pub fn favorites_of(&self, user_id: &UserId) -> Result<Vec<Favorite>, CatalogError> {
        Ok(self
            .db
            .select_as(FAVORITES, |row| row.text("user_id") == Some(user_id.as_str()))?)
    }

    pub fn is_favorite(&self, user_id: &UserId, ad_id: &AdId) -> Result<bool, CatalogError> {
        Ok(self.db.exists(FAVORITES, &pair_key(user_id, ad_id))?)
    }

    pub fn reports(&self) -> Result<Vec<Report>, CatalogError> {
        Ok(self.db.all(REPORTS)?)
    }

    pub fn category_filters_of(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<UserCategoryFilter>, CatalogError> {
        Ok(self
            .db
            .select_as(CATEGORY_FILTERS, |row| row.text("user_id") == Some(user_id.as_str()))?)
    }
}
