//! Scan command implementation

use super::build_orchestrator;
use crate::config::Config;
use crate::data::ScanArchive;
use crate::market::MarketQuery;
use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Only scan markets in this category
    #[arg(long)]
    pub category: Option<String>,

    /// Markets fetched per platform
    #[arg(long, default_value = "50")]
    pub limit: usize,

    /// Minimum absolute edge for new opportunities (defaults to scan.default_min_edge)
    #[arg(long)]
    pub min_edge: Option<Decimal>,

    /// Write the opportunities to a Parquet file under data.output_dir
    #[arg(long)]
    pub archive: bool,
}

impl ScanArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let orchestrator = build_orchestrator(config)?;
        let query = MarketQuery {
            category: self.category.clone(),
            limit: self.limit,
        };
        let min_edge = self.min_edge.unwrap_or(config.scan.default_min_edge);

        tracing::info!(category = ?query.category, limit = query.limit, min_edge = %min_edge, "Scanning markets");
        let scanned_at = Utc::now();
        let report = orchestrator.scan_sources(&query, min_edge).await;

        if self.archive || config.data.archive_enabled {
            let archive = ScanArchive::new(config.data.output_dir.clone());
            match archive.write_scan(&report.opportunities, scanned_at)? {
                Some(path) => tracing::info!(path = ?path, "Scan archived"),
                None => tracing::info!("No opportunities to archive"),
            }
        }

        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}
