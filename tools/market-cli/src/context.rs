//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use market_catalog::config::MarketConfig;
use market_catalog::Marketplace;
use market_observability::LogLevel;

use crate::config::CliConfig;
use crate::output::Output;
use crate::snapshot::Snapshot;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the config was read from, if anywhere.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, snapshot: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (mut config, config_path) = if let Some(path) = config_path {
            (CliConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            // Try to find config in current directory or parent directories
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => {
                    output.debug("No config file found, using defaults");
                    (CliConfig::default(), None)
                }
            }
        };

        if let Some(snapshot) = snapshot {
            config.snapshot = snapshot.to_string();
        }
        // Service logs go to stderr; keep them to warnings unless asked.
        config.market.logging.level = if output.is_verbose() {
            LogLevel::Debug
        } else {
            config.market.logging.level.max(LogLevel::Warn)
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let config_names = ["market.toml", ".market.toml", "market.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Path of the snapshot file.
    ///
    /// A relative snapshot path is resolved against the directory holding the
    /// config file, or the working directory when no config was found.
    pub fn snapshot_path(&self) -> PathBuf {
        let base = self
            .config_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(self.cwd.as_path());
        let path = PathBuf::from(&self.config.snapshot);
        if path.is_absolute() {
            path
        } else {
            base.join(path)
        }
    }

    /// Load the snapshot into a marketplace using the configured settings.
    pub fn market(&self) -> Result<Marketplace> {
        self.market_with(self.config.market.clone())
    }

    /// Load the snapshot into a marketplace using the given settings.
    pub fn market_with(&self, config: MarketConfig) -> Result<Marketplace> {
        config.validate().context("Invalid marketplace configuration")?;

        let path = self.snapshot_path();
        self.output
            .debug(&format!("Loading snapshot {}", path.display()));
        let snapshot = Snapshot::load(&path)?;
        snapshot
            .into_marketplace(config)
            .with_context(|| format!("Failed to load snapshot: {}", path.display()))
    }
}
