//! Filter, sort and page through ads.

use anyhow::{bail, Result};
use market_catalog::prelude::*;

use super::SearchArgs;
use crate::context::Context;
use crate::output::{format_price, status_badge};

/// Build the query described by the arguments.
fn build_query(args: &SearchArgs) -> Result<AdQuery> {
    let Some(sort) = AdSort::from_field(&args.sort, &args.direction) else {
        bail!("Unknown sort field '{}'", args.sort);
    };

    let mut query = AdQuery::new()
        .with_sort(sort)
        .with_pagination(args.limit, args.offset);
    if let Some(text) = &args.text {
        query = query.with_text(text.as_str());
    }
    if let Some(category) = &args.category {
        query = query.with_filter(AdFilter::category(category.as_str()));
    }
    if args.min_price.is_some() || args.max_price.is_some() {
        query = query.with_filter(AdFilter::price_range(args.min_price, args.max_price));
    }
    Ok(query)
}

/// Run the search command.
pub fn run(args: SearchArgs, ctx: &Context) -> Result<()> {
    let query = build_query(&args)?;
    let market = ctx.market()?;
    let viewer = Viewer {
        user_id: None,
        country: args.country.map(CountryId::new),
    };
    let page = market.search(&viewer, &query)?;

    if ctx.output.is_json() {
        ctx.output.json(&page);
        return Ok(());
    }

    ctx.output.header(&format!("{} ad(s)", page.count));
    if let Some(lca) = &page.lca_category {
        let name = market.category(lca).map(|c| c.name).unwrap_or_default();
        ctx.output.kv("category", &format!("{} ({})", name, lca));
    }
    if page.is_empty() {
        ctx.output.info("No ads on this page.");
        return Ok(());
    }

    ctx.output.table_row(&["AD", "CATEGORY", "STATUS", "PRICE"], &[24, 20, 10, 12]);
    for ad in &page.results {
        ctx.output.table_row(
            &[
                ad.id.as_str(),
                ad.category_id.as_str(),
                &status_badge(ad.status.as_str()),
                &format_price(ad.price()),
            ],
            &[24, 20, 10, 12],
        );
    }
    if let Some(next) = page.next_offset {
        ctx.output.info(&format!("More results: --offset {}", next));
    }

    Ok(())
}
