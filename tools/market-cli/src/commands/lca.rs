//! Lowest common ancestor of a set of ads.

use anyhow::Result;
use market_catalog::prelude::*;
use serde_json::json;

use super::LcaArgs;
use crate::context::Context;

/// Run the lca command.
pub fn run(args: LcaArgs, ctx: &Context) -> Result<()> {
    let market = ctx.market()?;
    let ids: Vec<AdId> = args.ads.into_iter().map(AdId::new).collect();
    let lca = market.lca_of(&ids)?;

    if ctx.output.is_json() {
        ctx.output.json(&json!({ "ads": ids, "lca_category": lca }));
        return Ok(());
    }

    match lca {
        Some(category) => {
            ctx.output.success(&format!("{} ({})", category.name, category.id));
            ctx.output.kv("level", &category.level.to_string());
        }
        None => ctx.output.info("No common category."),
    }

    Ok(())
}
