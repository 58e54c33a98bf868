//! Check a snapshot and the configuration.

use anyhow::{Context as _, Result};
use market_catalog::prelude::*;
use serde_json::json;

use super::ValidateArgs;
use crate::context::Context;

/// Run the validate command.
pub fn run(args: ValidateArgs, ctx: &Context) -> Result<()> {
    ctx.config
        .market
        .validate()
        .context("Invalid marketplace configuration")?;
    ctx.output.success("Configuration is valid");

    if args.config_only {
        if ctx.output.is_json() {
            ctx.output.json(&json!({ "config": "ok" }));
        }
        return Ok(());
    }

    let market = ctx.market()?;
    let tree = market.tree()?;
    tree.validate().context("Category closure is inconsistent")?;

    let ads = market.store().ads()?;
    let favorites = market.store().favorites()?;
    let active = ads.iter().filter(|ad| ad.is_active()).count();
    let depth = tree.iter().map(|c| c.level).max().unwrap_or(0);
    let selectable = tree.iter().filter(|c| c.is_selectable()).count();

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "config": "ok",
            "categories": tree.len(),
            "selectable_categories": selectable,
            "depth": depth,
            "ads": ads.len(),
            "active_ads": active,
            "favorites": favorites.len(),
        }));
        return Ok(());
    }

    ctx.output.success(&format!(
        "Snapshot is valid: {}",
        ctx.snapshot_path().display()
    ));
    ctx.output.kv("categories", &tree.len().to_string());
    ctx.output.kv("selectable", &selectable.to_string());
    ctx.output.kv("depth", &depth.to_string());
    ctx.output.kv("ads", &format!("{} ({} active)", ads.len(), active));
    ctx.output.kv("favorites", &favorites.len().to_string());

    Ok(())
}
