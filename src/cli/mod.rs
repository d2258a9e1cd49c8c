//! CLI interface for poly-alpha
//!
//! Provides subcommands for:
//! - `scan`: Scan configured platforms for mispriced markets
//! - `predict`: Estimate a single question
//! - `config`: Show effective configuration

mod predict;
mod scan;

pub use predict::PredictArgs;
pub use scan::ScanArgs;

use crate::config::Config;
use crate::market::{GammaClient, GammaConfig};
use crate::news::NewsSearchClient;
use crate::scan::ScanOrchestrator;
use crate::storage::InMemoryStore;
use clap::{Parser, Subcommand};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "poly-alpha")]
#[command(about = "Probability estimation and edge detection for prediction markets")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan markets for opportunities
    Scan(ScanArgs),
    /// Estimate the probability of a single question
    Predict(PredictArgs),
    /// Show effective configuration
    Config,
}

/// Orchestrator wired to the sources named in the config
pub fn build_orchestrator(config: &Config) -> anyhow::Result<ScanOrchestrator> {
    let store = Arc::new(InMemoryStore::new());
    let mut orchestrator = ScanOrchestrator::new(config, store);

    if !config.sources.gamma_url.is_empty() {
        let gamma = GammaClient::with_config(GammaConfig {
            base_url: config.sources.gamma_url.clone(),
            timeout: config.scan.fetch_timeout(),
        })?;
        orchestrator = orchestrator.with_market_source(Arc::new(gamma));
    }

    for endpoint in &config.sources.news {
        let client = NewsSearchClient::new(
            endpoint.name.clone(),
            endpoint.base_url.clone(),
            endpoint.api_key.clone(),
            config.scan.fetch_timeout(),
        )?;
        orchestrator = orchestrator.with_article_source(Arc::new(client));
    }
    if config.sources.news.is_empty() {
        tracing::warn!("No news sources configured, estimates will rest on base rates");
    }

    Ok(orchestrator)
}
