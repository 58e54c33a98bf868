//! Configuration management commands.

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Current Configuration");

    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }
    ctx.output.kv("snapshot", &ctx.snapshot_path().display().to_string());

    let market = &ctx.config.market;

    ctx.output.info("");
    ctx.output.info("[ranking]");
    ctx.output.kv("similar_limit", &market.ranking.similar_limit.to_string());
    ctx.output.kv("recency_weight", &market.ranking.recency_weight.to_string());
    ctx.output.kv("popularity_weight", &market.ranking.popularity_weight.to_string());

    ctx.output.info("");
    ctx.output.info("[moderation]");
    ctx.output.kv("report_threshold", &market.moderation.report_threshold.to_string());

    ctx.output.info("");
    ctx.output.info("[preferences]");
    ctx.output.kv("ad_expiry_enabled", &market.preferences.ad_expiry_enabled.to_string());
    ctx.output.kv("ad_expiry_days", &market.preferences.ad_expiry_days.to_string());

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output.kv("level", &format!("{:?}", market.logging.level).to_lowercase());
    ctx.output.kv("format", &format!("{:?}", market.logging.format).to_lowercase());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let path = ctx.cwd.join("market.toml");

    if path.exists() && !force {
        bail!("market.toml already exists. Use --force to overwrite.");
    }

    std::fs::write(&path, generate_default_config(&ctx.config.snapshot))?;
    ctx.output.success(&format!("Created {}", path.display()));

    Ok(())
}
