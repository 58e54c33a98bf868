//! Marketplace service: the operations the request layer calls.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use market_observability::{LogOutput, RequestId, StructuredLogger};
use serde::Serialize;

use crate::catalog::{
    current_timestamp, favorite_counts, pair_key, Ad, Category, CategoryTree, Favorite,
    FavoriteToggle, NewAd, NewCategory, Report, ReportCategory, Status, TreeListener,
    UserCategoryFilter, MAX_REPORT_DESCRIPTION,
};
use crate::config::MarketConfig;
use crate::error::CatalogError;
use crate::ids::{AdId, CategoryId, CountryId, ReportId, UserId};
use crate::ranking::{lowest_common_ancestor, similar_ads, TrendingRanker, TrendingScore};
use crate::search::{AdFilter, AdPage, AdQuery, Pagination};
use crate::store::{CatalogStore, ADS, CATEGORY_FILTERS, FAVORITES, REPORTS};

/// Who is asking. Anonymous viewers see every country.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Viewer {
    pub user_id: Option<UserId>,
    pub country: Option<CountryId>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(user_id: impl Into<UserId>, country: impl Into<CountryId>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            country: Some(country.into()),
        }
    }
}

/// An ad with its trending score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingAd {
    pub ad: Ad,
    pub score: TrendingScore,
}

/// An ad suggested next to another, with its level distance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelatedAd {
    pub ad: Ad,
    pub diff: i32,
}

/// The classifieds marketplace.
///
/// Holds the category tree in memory and every record in a [`CatalogStore`].
/// Tree mutations run on a copy of the tree, are persisted in one
/// transaction, and only then replace the cached tree. Listeners are told
/// about the change after it is committed.
pub struct Marketplace {
    store: CatalogStore,
    tree: RwLock<CategoryTree>,
    listeners: RwLock<Vec<Arc<dyn TreeListener>>>,
    config: MarketConfig,
    logger: StructuredLogger,
    clock: fn() -> i64,
}

impl Marketplace {
    /// Create an empty marketplace over an in-memory store.
    pub fn new(config: MarketConfig) -> Self {
        Self::with_store(CatalogStore::in_memory(), CategoryTree::new(), config)
    }

    /// Open a marketplace over an existing store, loading its category tree.
    pub fn open(store: CatalogStore, config: MarketConfig) -> Result<Self, CatalogError> {
        let tree = store.load_tree()?;
        Ok(Self::with_store(store, tree, config))
    }

    fn with_store(store: CatalogStore, tree: CategoryTree, config: MarketConfig) -> Self {
        let logger = StructuredLogger::new(RequestId::generate())
            .with_component("catalog")
            .with_min_level(config.logging.level)
            .with_format(config.logging.format);

        Self {
            store,
            tree: RwLock::new(tree),
            listeners: RwLock::new(Vec::new()),
            config,
            logger,
            clock: current_timestamp,
        }
    }

    /// Replace the logger.
    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Send log lines to the given output.
    pub fn with_log_output(mut self, output: LogOutput) -> Self {
        self.logger = self.logger.with_output(output);
        self
    }

    /// Replace the clock used for timestamps and expiry checks.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// Register a listener for committed tree changes.
    pub fn subscribe(&self, listener: Arc<dyn TreeListener>) -> Result<(), CatalogError> {
        self.listeners
            .write()
            .map_err(|_| poisoned("listener registry"))?
            .push(listener);
        Ok(())
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// Read access to the category tree.
    pub fn tree(&self) -> Result<RwLockReadGuard<'_, CategoryTree>, CatalogError> {
        self.tree.read().map_err(|_| poisoned("category tree"))
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }

    // Categories

    /// Create a category and persist the updated closure.
    pub fn create_category(&self, new: NewCategory) -> Result<Category, CatalogError> {
        let name = new.name.clone();
        let category = self.mutate_tree("create_category", |tree| tree.create_category(new))?;

        self.logger
            .info_builder("category created")
            .field("category_id", category.id.as_str())
            .field("name", name)
            .field_i64("depth", category.level as i64)
            .emit();
        Ok(category)
    }

    /// Move a category and its subtree under a new parent.
    pub fn set_parent(
        &self,
        id: &CategoryId,
        new_parent: Option<&CategoryId>,
    ) -> Result<(), CatalogError> {
        self.mutate_tree("set_parent", |tree| tree.set_parent(id, new_parent))?;

        self.logger
            .info_builder("category moved")
            .field("category_id", id.as_str())
            .field("parent_id", new_parent.map_or("", |p| p.as_str()))
            .emit();
        Ok(())
    }

    pub fn category(&self, id: &CategoryId) -> Result<Category, CatalogError> {
        Ok(self.tree()?.require(id)?.clone())
    }

    fn mutate_tree<R>(
        &self,
        action: &str,
        f: impl FnOnce(&mut CategoryTree) -> Result<R, CatalogError>,
    ) -> Result<R, CatalogError> {
        let mut guard = self.tree.write().map_err(|_| poisoned("category tree"))?;
        let mut working = guard.clone();

        let outcome = f(&mut working).and_then(|result| {
            let dirty = working.take_dirty();
            self.store
                .transaction(|tx| CatalogStore::save_categories(tx, &working, &dirty))?;
            Ok(result)
        });
        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                self.logger
                    .warn_builder("category change rejected")
                    .field("action", action)
                    .field("error", e.to_string())
                    .emit();
                return Err(e);
            }
        };

        let events = working.take_events();
        *guard = working;
        drop(guard);

        let listeners = self.listeners.read().map_err(|_| poisoned("listener registry"))?;
        for event in &events {
            for listener in listeners.iter() {
                listener.on_tree_event(event);
            }
        }
        Ok(result)
    }

    // Ads

    /// Post an ad for `owner`.
    ///
    /// The expiry is derived from the ad preferences when expiry is enabled.
    pub fn post_ad(&self, owner: &UserId, new: NewAd) -> Result<Ad, CatalogError> {
        {
            let tree = self.tree()?;
            let category = tree.require(&new.category_id)?;
            if category.status != Status::Active {
                return Err(CatalogError::ValidationError(format!(
                    "category {} is not active",
                    category.id
                )));
            }
        }

        let now = self.now();
        let mut ad = Ad::new(
            new.id.unwrap_or_else(AdId::generate),
            new.category_id,
            owner.clone(),
            now,
        )
        .with_type(new.ad_type)
        .with_attributes(new.attributes);
        if let Some(until) = new.promoted_until {
            ad = ad.promoted_until(until);
        }
        ad.expires_at = self.config.preferences.expiry_for(now);

        self.store.transaction(|tx| CatalogStore::insert_ad(tx, &ad))?;

        self.logger
            .debug_builder("ad posted")
            .field("ad_id", ad.id.as_str())
            .field("category_id", ad.category_id.as_str())
            .field("owner_id", owner.as_str())
            .emit();
        Ok(ad)
    }

    pub fn ad(&self, id: &AdId) -> Result<Ad, CatalogError> {
        self.store.ad(id)
    }

    /// Active ads the viewer may browse, newest first.
    ///
    /// With ad expiry enabled only promoted or unexpired ads are listed.
    pub fn browse(&self, viewer: &Viewer, pagination: Pagination) -> Result<AdPage<Ad>, CatalogError> {
        let mut query = self.visible_to(viewer).with_filter(AdFilter::active());
        query.pagination = pagination;
        if self.config.preferences.ad_expiry_enabled {
            query = query.with_filter(AdFilter::Unexpired { now: self.now() });
        }
        self.run(&query, false)
    }

    /// Active ads in a category subtree.
    ///
    /// Signed-in viewers get the category and each of its ancestors recorded
    /// in their category filter history.
    pub fn filter_by_category(
        &self,
        viewer: &Viewer,
        category_id: &CategoryId,
        pagination: Pagination,
    ) -> Result<AdPage<Ad>, CatalogError> {
        let recorded = self.tree()?.ancestor_chain(category_id, true)?;

        if let Some(user_id) = &viewer.user_id {
            let now = self.now();
            self.store.transaction(|tx| {
                for id in &recorded {
                    let entry = UserCategoryFilter {
                        user_id: user_id.clone(),
                        category_id: id.clone(),
                        created_at: now,
                    };
                    let key = format!("{}:{}:{}", user_id, id, uuid::Uuid::new_v4().simple());
                    tx.insert(CATEGORY_FILTERS, &key, &entry)?;
                }
                Ok(())
            })?;
            self.logger
                .debug_builder("category filter recorded")
                .field("user_id", user_id.as_str())
                .field("category_id", category_id.as_str())
                .field_i64("entries", recorded.len() as i64)
                .emit();
        }

        let mut query = AdQuery::new()
            .with_filter(AdFilter::active())
            .with_filter(AdFilter::Category(category_id.clone()));
        query.pagination = pagination;
        self.run(&query, false)
    }

    /// Run a query over the ads visible to the viewer.
    ///
    /// The page carries the lowest common ancestor of the whole filtered set.
    pub fn search(&self, viewer: &Viewer, query: &AdQuery) -> Result<AdPage<Ad>, CatalogError> {
        let mut scoped = self.visible_to(viewer);
        scoped.filters.extend(query.filters.iter().cloned());
        scoped.sort = query.sort;
        scoped.pagination = query.pagination;
        self.run(&scoped, true)
    }

    fn visible_to(&self, viewer: &Viewer) -> AdQuery {
        match &viewer.country {
            Some(country) => AdQuery::new().with_filter(AdFilter::Country(country.clone())),
            None => AdQuery::new(),
        }
    }

    fn run(&self, query: &AdQuery, with_lca: bool) -> Result<AdPage<Ad>, CatalogError> {
        let tree = self.tree()?;
        let ads = self.store.ads()?;
        let counts = favorite_counts(&self.store.favorites()?);
        let ranker = TrendingRanker::from_config(&self.config.ranking);

        let selected = query.select(&tree, &ads);
        let lca = if with_lca {
            lowest_common_ancestor(&tree, selected.iter().copied())?.map(|c| c.id.clone())
        } else {
            None
        };
        let sorted = query.sort.sort(selected, &ranker, &counts, self.now());

        let page = AdPage::paginate(sorted, query.pagination)
            .with_lca_category(lca)
            .map(Ad::clone);
        self.logger
            .debug_builder("ads listed")
            .field_i64("count", page.count as i64)
            .field_i64("returned", page.results.len() as i64)
            .field("lca_category", page.lca_category.as_ref().map_or("", |c| c.as_str()))
            .emit();
        Ok(page)
    }

    /// Active ads visible to the viewer, ranked by trending factor.
    pub fn trending(&self, viewer: &Viewer, limit: usize) -> Result<Vec<TrendingAd>, CatalogError> {
        let tree = self.tree()?;
        let ads = self.store.ads()?;
        let counts = favorite_counts(&self.store.favorites()?);

        let query = self.visible_to(viewer).with_filter(AdFilter::active());
        let selected = query.select(&tree, &ads);
        let ranked = TrendingRanker::from_config(&self.config.ranking).rank(
            selected,
            &counts,
            self.now(),
        );

        let trending: Vec<TrendingAd> = ranked
            .into_iter()
            .take(limit)
            .map(|r| TrendingAd {
                ad: r.ad.clone(),
                score: r.score,
            })
            .collect();
        self.logger
            .debug_builder("trending ranked")
            .field_i64("returned", trending.len() as i64)
            .emit();
        Ok(trending)
    }

    /// Ads similar to the given one, nearest categories first.
    pub fn similar(&self, ad_id: &AdId) -> Result<Vec<RelatedAd>, CatalogError> {
        let reference = self.store.ad(ad_id)?;
        let tree = self.tree()?;
        let ads = self.store.ads()?;

        let similar = similar_ads(&tree, &reference, &ads, self.config.ranking.similar_limit)?;
        self.logger
            .debug_builder("similar ads resolved")
            .field("ad_id", ad_id.as_str())
            .field_i64("returned", similar.len() as i64)
            .emit();
        Ok(similar
            .into_iter()
            .map(|s| RelatedAd {
                ad: s.ad.clone(),
                diff: s.diff,
            })
            .collect())
    }

    /// Lowest common ancestor of the given ads' categories.
    pub fn lca_of(&self, ad_ids: &[AdId]) -> Result<Option<Category>, CatalogError> {
        let ads = ad_ids
            .iter()
            .map(|id| self.store.ad(id))
            .collect::<Result<Vec<_>, _>>()?;
        let tree = self.tree()?;
        Ok(lowest_common_ancestor(&tree, &ads)?.cloned())
    }

    // Favorites

    /// Add the ad to the user's favorites, or remove it if already there.
    pub fn toggle_favorite(&self, user_id: &UserId, ad_id: &AdId) -> Result<FavoriteToggle, CatalogError> {
        self.store.ad(ad_id)?;
        let now = self.now();
        let key = pair_key(user_id, ad_id);

        let toggle = self.store.transaction(|tx| {
            if tx.delete(FAVORITES, &key) {
                return Ok(FavoriteToggle::Removed);
            }
            tx.insert(FAVORITES, &key, &Favorite::new(user_id.clone(), ad_id.clone(), now))?;
            Ok(FavoriteToggle::Added)
        })?;

        self.logger
            .debug_builder(toggle.message())
            .field("user_id", user_id.as_str())
            .field("ad_id", ad_id.as_str())
            .emit();
        Ok(toggle)
    }

    /// The user's favorite ads, in favorite order. Deleted ads are skipped.
    pub fn favorites_of(&self, user_id: &UserId) -> Result<Vec<Ad>, CatalogError> {
        let mut favorites = self.store.favorites_of(user_id)?;
        favorites.sort_by_key(|f| f.created_at);

        let mut ads = Vec::with_capacity(favorites.len());
        for favorite in favorites {
            match self.store.ad(&favorite.ad_id) {
                Ok(ad) => ads.push(ad),
                Err(CatalogError::AdNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(ads)
    }

    /// Whether each of the given ads is in the viewer's favorites.
    pub fn favorited(&self, viewer: &Viewer, ad_ids: &[AdId]) -> Result<HashMap<AdId, bool>, CatalogError> {
        let mut flags = HashMap::with_capacity(ad_ids.len());
        for id in ad_ids {
            let favorited = match &viewer.user_id {
                Some(user_id) => self.store.is_favorite(user_id, id)?,
                None => false,
            };
            flags.insert(id.clone(), favorited);
        }
        Ok(flags)
    }

    // Moderation

    /// File a report against an ad.
    ///
    /// Owners cannot report their own ads and each user reports an ad at
    /// most once. Once the ad collects `report_threshold` reports it is
    /// deactivated.
    pub fn report_ad(
        &self,
        user_id: &UserId,
        ad_id: &AdId,
        category: ReportCategory,
        description: impl Into<String>,
    ) -> Result<Report, CatalogError> {
        let description = description.into();
        if description.chars().count() > MAX_REPORT_DESCRIPTION {
            return Err(CatalogError::ValidationError(format!(
                "report description is longer than {} characters",
                MAX_REPORT_DESCRIPTION
            )));
        }

        let mut ad = self.store.ad(ad_id)?;
        if &ad.owner_id == user_id {
            self.logger
                .warn_builder("own ad report rejected")
                .field("ad_id", ad_id.as_str())
                .emit();
            return Err(CatalogError::OwnAdReport(ad_id.to_string()));
        }

        let report = Report {
            id: ReportId::generate(),
            ad_id: ad_id.clone(),
            user_id: user_id.clone(),
            category,
            description,
            created_at: self.now(),
        };
        let threshold = self.config.moderation.report_threshold;

        let (report_count, deactivated) = self.store.transaction(|tx| {
            if tx.get::<Report>(REPORTS, &report.key())?.is_some() {
                return Err(CatalogError::AlreadyReported(ad_id.to_string()));
            }
            tx.insert(REPORTS, &report.key(), &report)?;

            let report_count = tx.count(REPORTS, |row| row.text("ad_id") == Some(ad_id.as_str()));
            let deactivate = report_count >= threshold && ad.status == Status::Active;
            if deactivate {
                ad.status = Status::Inactive;
                ad.updated_at = Some(report.created_at);
                tx.upsert(ADS, ad_id.as_str(), &ad)?;
            }
            Ok((report_count, deactivate))
        })?;

        let entry = if deactivated {
            self.logger.warn_builder("ad deactivated after reports")
        } else {
            self.logger.info_builder("ad reported")
        };
        entry
            .field("ad_id", ad_id.as_str())
            .field("category", report.category.as_str())
            .field_i64("reports", report_count as i64)
            .emit();
        Ok(report)
    }

    /// Reports on ads in the viewer's country, or all reports for anonymous viewers.
    pub fn reports(&self, viewer: &Viewer) -> Result<Vec<Report>, CatalogError> {
        let reports = self.store.reports()?;
        let country = match &viewer.country {
            Some(country) => country,
            None => return Ok(reports),
        };

        let tree = self.tree()?;
        let mut visible = Vec::new();
        for report in reports {
            let ad = match self.store.ad(&report.ad_id) {
                Ok(ad) => ad,
                Err(CatalogError::AdNotFound(_)) => continue,
                Err(e) => return Err(e),
            };
            if AdFilter::Country(country.clone()).matches(&ad, &tree) {
                visible.push(report);
            }
        }
        Ok(visible)
    }

    /// The categories the user has browsed.
    pub fn category_filters_of(&self, user_id: &UserId) -> Result<Vec<UserCategoryFilter>, CatalogError> {
        self.store.category_filters_of(user_id)
    }
}

fn poisoned(what: &str) -> CatalogError {
    CatalogError::DatabaseError(format!("{} lock poisoned", what))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryVersion;
    use serde_json::json;

    fn clock() -> i64 {
        10_000
    }

    fn market() -> Marketplace {
        let (output, _) = LogOutput::memory();
        let market = Marketplace::new(MarketConfig::default())
            .with_clock(clock)
            .with_log_output(output);
        market
            .create_category(NewCategory::new("Vehicles", "et").with_id("vehicles"))
            .unwrap();
        market
            .create_category(NewCategory::new("Cars", "et").with_id("cars").with_parent("vehicles"))
            .unwrap();
        market
            .create_category(NewCategory::new("Bikes", "et").with_id("bikes").with_parent("vehicles"))
            .unwrap();
        market
    }

    #[test]
    fn test_events_published_after_commit() {
        let market = market();
        let version = Arc::new(CategoryVersion::default());
        market.subscribe(version.clone()).unwrap();

        market
            .create_category(NewCategory::new("Trucks", "et").with_parent("vehicles"))
            .unwrap();
        market
            .set_parent(&CategoryId::new("bikes"), Some(&CategoryId::new("cars")))
            .unwrap();
        assert_eq!(version.current(), 2);

        let err = market
            .set_parent(&CategoryId::new("vehicles"), Some(&CategoryId::new("bikes")))
            .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidReparent { .. }));
        assert_eq!(version.current(), 2);
    }

    #[test]
    fn test_tree_persisted() {
        let market = market();
        market
            .set_parent(&CategoryId::new("bikes"), Some(&CategoryId::new("cars")))
            .unwrap();

        let stored = market.store().load_tree().unwrap();
        let bikes = stored.get(&CategoryId::new("bikes")).unwrap();
        assert_eq!(bikes.level, 3);
        assert!(stored
            .get(&CategoryId::new("cars"))
            .unwrap()
            .descendants
            .contains(&CategoryId::new("bikes")));
    }

    #[test]
    fn test_post_ad_with_expiry() {
        let mut config = MarketConfig::default();
        config.preferences.ad_expiry_enabled = true;
        config.preferences.ad_expiry_days = 2;
        let market = Marketplace::new(config).with_clock(clock);
        market
            .create_category(NewCategory::new("Cars", "et").with_id("cars"))
            .unwrap();

        let ad = market
            .post_ad(&UserId::new("u1"), NewAd::new("cars").with_attributes(json!({"price": 5})))
            .unwrap();
        assert_eq!(ad.created_at, 10_000);
        assert_eq!(ad.expires_at, Some(10_000 + 2 * 86_400));
        assert_eq!(market.ad(&ad.id).unwrap(), ad);
    }

    #[test]
    fn test_post_ad_unknown_category() {
        let market = market();
        let err = market
            .post_ad(&UserId::new("u1"), NewAd::new("boats"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::CategoryNotFound(_)));
    }

    #[test]
    fn test_toggle_favorite() {
        let market = market();
        let ad = market
            .post_ad(&UserId::new("seller"), NewAd::new("cars").with_id("a1"))
            .unwrap();
        let user = UserId::new("buyer");

        assert_eq!(market.toggle_favorite(&user, &ad.id).unwrap(), FavoriteToggle::Added);
        assert_eq!(market.favorites_of(&user).unwrap(), vec![ad.clone()]);
        let flags = market.favorited(&Viewer::user("buyer", "et"), &[ad.id.clone()]).unwrap();
        assert_eq!(flags.get(&ad.id), Some(&true));

        assert_eq!(market.toggle_favorite(&user, &ad.id).unwrap(), FavoriteToggle::Removed);
        assert!(market.favorites_of(&user).unwrap().is_empty());

        let err = market.toggle_favorite(&user, &AdId::new("ghost")).unwrap_err();
        assert!(matches!(err, CatalogError::AdNotFound(_)));
    }

    #[test]
    fn test_report_rules() {
        let market = market();
        let ad = market
            .post_ad(&UserId::new("seller"), NewAd::new("cars").with_id("a1"))
            .unwrap();

        let err = market
            .report_ad(&UserId::new("seller"), &ad.id, ReportCategory::Spam, "mine")
            .unwrap_err();
        assert!(matches!(err, CatalogError::OwnAdReport(_)));

        market
            .report_ad(&UserId::new("r1"), &ad.id, ReportCategory::Fraud, "scam")
            .unwrap();
        let err = market
            .report_ad(&UserId::new("r1"), &ad.id, ReportCategory::Fraud, "again")
            .unwrap_err();
        assert!(matches!(err, CatalogError::AlreadyReported(_)));

        let err = market
            .report_ad(&UserId::new("r2"), &ad.id, ReportCategory::Other, "x".repeat(251))
            .unwrap_err();
        assert!(matches!(err, CatalogError::ValidationError(_)));
        assert_eq!(market.reports(&Viewer::anonymous()).unwrap().len(), 1);
    }

    #[test]
    fn test_colon_ids_do_not_share_records() {
        let market = market();
        for id in ["x", "1:x"] {
            market
                .post_ad(&UserId::new("seller"), NewAd::new("cars").with_id(id))
                .unwrap();
        }
        let (first_user, first_ad) = (UserId::new("u:1"), AdId::new("x"));
        let (second_user, second_ad) = (UserId::new("u"), AdId::new("1:x"));

        assert_eq!(market.toggle_favorite(&first_user, &first_ad).unwrap(), FavoriteToggle::Added);
        assert_eq!(market.toggle_favorite(&second_user, &second_ad).unwrap(), FavoriteToggle::Added);
        assert_eq!(market.favorites_of(&first_user).unwrap().len(), 1);
        assert_eq!(market.favorites_of(&second_user).unwrap().len(), 1);

        market
            .report_ad(&first_user, &first_ad, ReportCategory::Spam, "spam")
            .unwrap();
        market
            .report_ad(&second_user, &second_ad, ReportCategory::Spam, "spam")
            .unwrap();
        assert_eq!(market.reports(&Viewer::anonymous()).unwrap().len(), 2);
    }

    #[test]
    fn test_filter_records_ancestors() {
        let market = market();
        let viewer = Viewer::user("u1", "et");
        market
            .filter_by_category(&viewer, &CategoryId::new("cars"), Pagination::default())
            .unwrap();

        let mut recorded: Vec<String> = market
            .category_filters_of(&UserId::new("u1"))
            .unwrap()
            .into_iter()
            .map(|f| f.category_id.into_inner())
            .collect();
        recorded.sort();
        assert_eq!(recorded, vec!["cars", "vehicles"]);

        market
            .filter_by_category(&Viewer::anonymous(), &CategoryId::new("cars"), Pagination::default())
            .unwrap();
        assert_eq!(market.category_filters_of(&UserId::new("u1")).unwrap().len(), 2);
    }

    #[test]
    fn test_rejected_change_is_logged() {
        let (output, lines) = LogOutput::memory();
        let market = market().with_log_output(output);

        let _ = market.create_category(NewCategory::new("Cars", "et").with_parent("vehicles"));

        let lines = lines.lock().unwrap();
        assert!(lines.iter().any(|l| l.contains("category change rejected")));
    }
}
