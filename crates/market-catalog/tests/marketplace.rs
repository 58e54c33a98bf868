use std::sync::Arc;

use market_catalog::prelude::*;
use market_db::DbError;
use market_observability::LogOutput;
use serde_json::json;

fn clock() -> i64 {
    1_000_000
}

fn quiet(market: Marketplace) -> Marketplace {
    let (output, _) = LogOutput::memory();
    market.with_clock(clock).with_log_output(output)
}

/// root -> a -> b -> c, root -> x, plus a Kenyan root
fn seeded(config: MarketConfig) -> Marketplace {
    let market = quiet(Marketplace::new(config));
    for (id, parent, country) in [
        ("root", None, "et"),
        ("a", Some("root"), "et"),
        ("b", Some("a"), "et"),
        ("c", Some("b"), "et"),
        ("x", Some("root"), "et"),
        ("homes", None, "ke"),
    ] {
        let mut new = NewCategory::new(id.to_uppercase(), country).with_id(id);
        if let Some(parent) = parent {
            new = new.with_parent(parent);
        }
        market.create_category(new).unwrap();
    }
    market
}

fn post(market: &Marketplace, id: &str, category: &str, owner: &str) -> Ad {
    market
        .post_ad(
            &UserId::new(owner),
            NewAd::new(category)
                .with_id(id)
                .with_attributes(json!({"title": format!("listing {}", id)})),
        )
        .unwrap()
}

fn ids(ads: &[Ad]) -> Vec<&str> {
    ads.iter().map(|ad| ad.id.as_str()).collect()
}

#[test]
fn test_search_page_carries_lca() {
    let market = seeded(MarketConfig::default());
    post(&market, "in-b", "b", "seller");
    post(&market, "in-c", "c", "seller");
    post(&market, "in-x", "x", "seller");

    let query = AdQuery::new().with_filter(AdFilter::category("a"));
    let page = market.search(&Viewer::anonymous(), &query).unwrap();
    assert_eq!(page.count, 2);
    assert_eq!(page.lca_category, Some(CategoryId::new("a")));

    let query = AdQuery::new().with_text("listing");
    let page = market.search(&Viewer::user("u1", "et"), &query).unwrap();
    assert_eq!(page.count, 3);
    assert_eq!(page.lca_category, Some(CategoryId::new("root")));

    let query = AdQuery::new().with_text("nothing like this");
    let page = market.search(&Viewer::anonymous(), &query).unwrap();
    assert_eq!(page.count, 0);
    assert_eq!(page.lca_category, None);
}

#[test]
fn test_lca_spans_whole_set_not_page() {
    let market = seeded(MarketConfig::default());
    post(&market, "ad-1", "c", "seller");
    post(&market, "ad-2", "c", "seller");
    post(&market, "ad-3", "x", "seller");

    let query = AdQuery::new().with_sort(AdSort::CreatedAsc).with_pagination(1, 0);
    let page = market.search(&Viewer::anonymous(), &query).unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(page.next_offset, Some(1));
    assert_eq!(page.lca_category, Some(CategoryId::new("root")));
}

#[test]
fn test_country_partition() {
    let market = seeded(MarketConfig::default());
    post(&market, "car", "c", "seller");
    post(&market, "house", "homes", "seller");

    let page = market.browse(&Viewer::user("u1", "ke"), Pagination::default()).unwrap();
    assert_eq!(ids(&page.results), vec!["house"]);

    let page = market.browse(&Viewer::anonymous(), Pagination::default()).unwrap();
    assert_eq!(page.count, 2);
}

#[test]
fn test_reports_deactivate_ad() {
    let market = seeded(MarketConfig::default());
    let ad = post(&market, "dodgy", "c", "seller");

    let err = market
        .report_ad(&UserId::new("seller"), &ad.id, ReportCategory::Fraud, "my own")
        .unwrap_err();
    assert!(matches!(err, CatalogError::OwnAdReport(_)));

    for reporter in ["r1", "r2"] {
        market
            .report_ad(&UserId::new(reporter), &ad.id, ReportCategory::Fraud, "scam")
            .unwrap();
    }
    assert!(market.ad(&ad.id).unwrap().is_active());

    market
        .report_ad(&UserId::new("r3"), &ad.id, ReportCategory::Spam, "spam")
        .unwrap();
    assert_eq!(market.ad(&ad.id).unwrap().status, Status::Inactive);

    let page = market.browse(&Viewer::anonymous(), Pagination::default()).unwrap();
    assert!(page.results.is_empty());
    assert_eq!(market.reports(&Viewer::user("admin", "et")).unwrap().len(), 3);
    assert!(market.reports(&Viewer::user("admin", "ke")).unwrap().is_empty());
}

#[test]
fn test_trending_prefers_favorited() {
    let market = seeded(MarketConfig::default());
    post(&market, "plain", "c", "seller");
    let loved = post(&market, "loved", "x", "seller");
    for user in ["u1", "u2"] {
        market.toggle_favorite(&UserId::new(user), &loved.id).unwrap();
    }

    let trending = market.trending(&Viewer::anonymous(), 10).unwrap();
    assert_eq!(trending[0].ad.id.as_str(), "loved");
    assert_eq!(trending[0].score.favorite_count, 2);
    assert!((trending[0].score.trending_factor - 0.9).abs() < 1e-9);
    assert!((trending[1].score.trending_factor - 0.3).abs() < 1e-9);
}

#[test]
fn test_similar_ads_from_service() {
    let market = seeded(MarketConfig::default());
    let reference = post(&market, "ref", "c", "seller");
    for i in 0..7 {
        post(&market, &format!("peer-{}", i), "c", "seller");
    }
    post(&market, "far", "x", "seller");

    let similar = market.similar(&reference.id).unwrap();
    assert_eq!(similar.len(), 5);
    assert!(similar.iter().all(|s| s.diff == 0));
    assert!(similar.iter().all(|s| s.ad.id != reference.id));
}

#[test]
fn test_similar_limit_from_config() {
    let mut config = MarketConfig::default();
    config.ranking.similar_limit = 2;
    let market = seeded(config);
    let reference = post(&market, "ref", "c", "seller");
    post(&market, "b-1", "b", "seller");
    post(&market, "x-1", "x", "seller");
    post(&market, "x-2", "x", "seller");

    let similar = market.similar(&reference.id).unwrap();
    let found: Vec<(&str, i32)> = similar.iter().map(|s| (s.ad.id.as_str(), s.diff)).collect();
    // b-1 sits directly in an ancestor, so it is only reached through its parent.
    assert_eq!(found, vec![("b-1", 2), ("x-1", 3)]);
}

#[test]
fn test_reparent_keeps_closure_and_reloads() {
    let market = seeded(MarketConfig::default());
    let version = Arc::new(CategoryVersion::default());
    market.subscribe(version.clone()).unwrap();

    market
        .set_parent(&CategoryId::new("b"), Some(&CategoryId::new("x")))
        .unwrap();
    assert_eq!(version.current(), 1);

    let tree = market.tree().unwrap();
    tree.validate().unwrap();
    assert!(tree.get(&CategoryId::new("a")).unwrap().descendants.is_empty());
    assert_eq!(tree.get(&CategoryId::new("c")).unwrap().level, 4);
    drop(tree);

    let reloaded = market.store().load_tree().unwrap();
    reloaded.validate().unwrap();
    assert!(reloaded
        .get(&CategoryId::new("x"))
        .unwrap()
        .descendants
        .contains(&CategoryId::new("c")));
}

#[test]
fn test_open_existing_store() {
    let store = CatalogStore::in_memory();
    let mut tree = CategoryTree::new();
    tree.create_category(NewCategory::new("Jobs", "et").with_id("jobs"))
        .unwrap();
    let dirty = tree.take_dirty();
    store
        .transaction(|tx| CatalogStore::save_categories(tx, &tree, &dirty))
        .unwrap();

    let market = quiet(Marketplace::open(store, MarketConfig::default()).unwrap());
    assert_eq!(market.category(&CategoryId::new("jobs")).unwrap().name, "Jobs");
    post(&market, "gig", "jobs", "employer");
    assert_eq!(market.browse(&Viewer::anonymous(), Pagination::default()).unwrap().count, 1);
}

#[test]
fn test_failed_transaction_leaves_store_unchanged() {
    let market = seeded(MarketConfig::default());
    post(&market, "keep", "c", "seller");

    let result: Result<(), CatalogError> = market.store().transaction(|tx| {
        tx.delete("ads", "keep");
        tx.insert("ads", "ghost", &Ad::new("ghost", "c", "seller", 0))?;
        Err(DbError::TransactionAborted("forced".to_string()).into())
    });
    assert!(result.is_err());

    let stored = market.store().ads().unwrap();
    assert_eq!(ids(&stored), vec!["keep"]);
}

#[test]
fn test_expired_ads_hidden_when_enabled() {
    let mut config = MarketConfig::default();
    config.preferences.ad_expiry_enabled = true;
    config.preferences.ad_expiry_days = 0;
    let market = seeded(config);
    post(&market, "today", "c", "seller");
    market
        .post_ad(
            &UserId::new("seller"),
            NewAd::new("c").with_id("promoted").promoted_until(clock() + 60),
        )
        .unwrap();

    let page = market.browse(&Viewer::anonymous(), Pagination::default()).unwrap();
    assert_eq!(page.count, 2);

    let market = market.with_clock(|| 2_000_000);
    let page = market.browse(&Viewer::anonymous(), Pagination::default()).unwrap();
    assert!(page.results.is_empty());
}
