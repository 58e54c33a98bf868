//! CLI command implementations.

pub mod ancestors;
pub mod config;
pub mod lca;
pub mod search;
pub mod similar;
pub mod tree;
pub mod trending;
pub mod validate;

use clap::{Args, Subcommand};

/// Arguments for the tree command.
#[derive(Args)]
pub struct TreeArgs {
    /// Only show roots of this country.
    #[arg(long)]
    pub country: Option<String>,

    /// Start from this category instead of the roots.
    #[arg(short, long)]
    pub root: Option<String>,
}

/// Arguments for the ancestors command.
#[derive(Args)]
pub struct AncestorsArgs {
    /// Category ID.
    pub category: String,
}

/// Arguments for the lca command.
#[derive(Args)]
pub struct LcaArgs {
    /// Ad IDs.
    #[arg(required = true)]
    pub ads: Vec<String>,
}

/// Arguments for the similar command.
#[derive(Args)]
pub struct SimilarArgs {
    /// Reference ad ID.
    pub ad: String,

    /// Maximum number of ads (default: ranking.similar_limit).
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Arguments for the trending command.
#[derive(Args)]
pub struct TrendingArgs {
    /// Maximum number of ads.
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Only ads of this country.
    #[arg(long)]
    pub country: Option<String>,
}

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Free text matched against ad attributes.
    #[arg(short, long)]
    pub text: Option<String>,

    /// Only ads in this category or below.
    #[arg(long)]
    pub category: Option<String>,

    /// Only ads of this country.
    #[arg(long)]
    pub country: Option<String>,

    /// Minimum price.
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum price.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Sort field (created_at, price, trending).
    #[arg(long, default_value = "created_at")]
    pub sort: String,

    /// Sort direction (asc, desc).
    #[arg(long, default_value = "desc")]
    pub direction: String,

    /// Page size.
    #[arg(short, long, default_value_t = market_catalog::search::DEFAULT_PAGE_LIMIT)]
    pub limit: usize,

    /// Page offset.
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,
}

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    /// Only check the configuration.
    #[arg(long)]
    pub config_only: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Create a default config file
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}
