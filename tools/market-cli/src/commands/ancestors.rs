//! Show the breadcrumb of a category.

use anyhow::Result;
use market_catalog::prelude::*;

use super::AncestorsArgs;
use crate::context::Context;

/// Run the ancestors command.
pub fn run(args: AncestorsArgs, ctx: &Context) -> Result<()> {
    let market = ctx.market()?;
    let tree = market.tree()?;
    let path = tree.breadcrumb(&CategoryId::new(args.category))?;

    if ctx.output.is_json() {
        ctx.output.json(&path);
        return Ok(());
    }

    let names: Vec<&str> = path.iter().map(|c| c.name.as_str()).collect();
    ctx.output.info(&names.join(" › "));
    if let Some(category) = path.last() {
        ctx.output.kv("level", &category.level.to_string());
        ctx.output.kv("descendants", &category.descendants.len().to_string());
        ctx.output.kv("selectable", &category.is_selectable().to_string());
    }

    Ok(())
}
