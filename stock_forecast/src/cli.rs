//! Command-line plumbing shared by the stage binaries

use crate::config::PipelineConfig;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Arguments every stage accepts
#[derive(Debug, Parser)]
pub struct StageArgs {
    /// TOML file overriding the default directories and parameters
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl StageArgs {
    pub fn load_config(&self) -> Result<PipelineConfig> {
        PipelineConfig::load(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("failed to load config from {}", path.display()),
            None => "invalid default config".to_string(),
        })
    }
}

/// Install the fmt subscriber. `RUST_LOG` overrides the default `info` level.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
    Ok(())
}
