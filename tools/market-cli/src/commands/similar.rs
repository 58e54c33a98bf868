//! Ads similar to a given ad.

use anyhow::Result;
use market_catalog::prelude::*;

use super::SimilarArgs;
use crate::context::Context;
use crate::output::format_price;

/// Run the similar command.
pub fn run(args: SimilarArgs, ctx: &Context) -> Result<()> {
    let mut config = ctx.config.market.clone();
    if let Some(limit) = args.limit {
        config.ranking.similar_limit = limit;
    }
    let market = ctx.market_with(config)?;

    let reference = market.ad(&AdId::new(args.ad))?;
    let similar = market.similar(&reference.id)?;

    if ctx.output.is_json() {
        ctx.output.json(&similar);
        return Ok(());
    }

    ctx.output.header(&format!("Similar to {}", reference.id));
    if similar.is_empty() {
        ctx.output.info("No similar ads found.");
        return Ok(());
    }

    ctx.output.table_row(&["AD", "CATEGORY", "DIFF", "PRICE"], &[24, 20, 6, 12]);
    for related in &similar {
        ctx.output.table_row(
            &[
                related.ad.id.as_str(),
                related.ad.category_id.as_str(),
                &related.diff.to_string(),
                &format_price(related.ad.price()),
            ],
            &[24, 20, 6, 12],
        );
    }

    Ok(())
}
