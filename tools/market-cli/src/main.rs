//! Market CLI - Command line tool for a classifieds marketplace snapshot.
//!
//! Commands:
//! - `market tree` - Print the category tree
//! - `market ancestors` - Show the breadcrumb of a category
//! - `market lca` - Lowest common ancestor of a set of ads
//! - `market similar` - Ads similar to a given ad
//! - `market trending` - Trending ads
//! - `market search` - Filter, sort and page through ads
//! - `market validate` - Check a snapshot and the configuration
//! - `market config` - Show configuration

mod commands;
mod config;
mod context;
mod output;
mod snapshot;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    AncestorsArgs, ConfigArgs, LcaArgs, SearchArgs, SimilarArgs, TreeArgs, TrendingArgs,
    ValidateArgs,
};

/// Market CLI - Inspect category trees and rankings of a marketplace snapshot
#[derive(Parser)]
#[command(name = "market")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Snapshot file path (overrides the config)
    #[arg(short, long, global = true)]
    snapshot: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the category tree
    Tree(TreeArgs),

    /// Show the breadcrumb of a category
    Ancestors(AncestorsArgs),

    /// Lowest common ancestor category of a set of ads
    Lca(LcaArgs),

    /// Ads similar to a given ad
    Similar(SimilarArgs),

    /// Ads ranked by trending factor
    Trending(TrendingArgs),

    /// Filter, sort and page through ads
    Search(SearchArgs),

    /// Check a snapshot and the configuration
    Validate(ValidateArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let ctx = context::Context::load(cli.config.as_deref(), cli.snapshot.as_deref(), output)?;

    // Execute command
    let result = match cli.command {
        Commands::Tree(args) => commands::tree::run(args, &ctx),
        Commands::Ancestors(args) => commands::ancestors::run(args, &ctx),
        Commands::Lca(args) => commands::lca::run(args, &ctx),
        Commands::Similar(args) => commands::similar::run(args, &ctx),
        Commands::Trending(args) => commands::trending::run(args, &ctx),
        Commands::Search(args) => commands::search::run(args, &ctx),
        Commands::Validate(args) => commands::validate::run(args, &ctx),
        Commands::Config(args) => commands::config::run(args, &ctx),
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
