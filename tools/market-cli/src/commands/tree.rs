//! Print the category tree.

use anyhow::Result;
use market_catalog::prelude::*;

use super::TreeArgs;
use crate::context::Context;
use crate::output::status_badge;

/// Run the tree command.
pub fn run(args: TreeArgs, ctx: &Context) -> Result<()> {
    let market = ctx.market()?;
    let tree = market.tree()?;

    let starts: Vec<&Category> = match &args.root {
        Some(id) => vec![tree.require(&CategoryId::new(id.as_str()))?],
        None => {
            let country = args.country.map(CountryId::new);
            tree.roots(country.as_ref())
        }
    };

    if ctx.output.is_json() {
        let mut categories = Vec::new();
        for start in &starts {
            for id in tree.subtree(&start.id)? {
                categories.push(tree.require(&id)?);
            }
        }
        ctx.output.json(&categories);
        return Ok(());
    }

    if starts.is_empty() {
        ctx.output.info("No categories found.");
        return Ok(());
    }

    ctx.output.header("Categories");
    for start in starts {
        print_subtree(&tree, start, 0, ctx);
    }

    Ok(())
}

fn print_subtree(tree: &CategoryTree, category: &Category, depth: usize, ctx: &Context) {
    let mut line = format!("{} ({})", category.name, category.id);
    if category.status != Status::Active {
        line.push_str(&format!(" [{}]", status_badge(category.status.as_str())));
    }
    ctx.output.tree_line(depth, &line);

    for child in tree.children(&category.id) {
        print_subtree(tree, child, depth + 1, ctx);
    }
}
