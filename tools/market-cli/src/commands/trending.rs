//! Ads ranked by trending factor.

use anyhow::Result;
use market_catalog::prelude::*;

use super::TrendingArgs;
use crate::context::Context;
use crate::output::format_timestamp;

/// Run the trending command.
pub fn run(args: TrendingArgs, ctx: &Context) -> Result<()> {
    let market = ctx.market()?;
    let viewer = Viewer {
        user_id: None,
        country: args.country.map(CountryId::new),
    };
    let trending = market.trending(&viewer, args.limit)?;

    if ctx.output.is_json() {
        ctx.output.json(&trending);
        return Ok(());
    }

    ctx.output.header("Trending");
    if trending.is_empty() {
        ctx.output.info("No active ads.");
        return Ok(());
    }

    ctx.output.table_row(
        &["AD", "POSTED", "FAVS", "RECENCY", "POPULARITY", "SCORE"],
        &[24, 16, 5, 8, 10, 6],
    );
    for entry in &trending {
        let score = &entry.score;
        ctx.output.table_row(
            &[
                entry.ad.id.as_str(),
                &format_timestamp(entry.ad.created_at),
                &score.favorite_count.to_string(),
                &format!("{:.3}", score.duration_factor),
                &format!("{:.3}", score.fav_factor),
                &format!("{:.3}", score.trending_factor),
            ],
            &[24, 16, 5, 8, 10, 6],
        );
    }

    Ok(())
}
