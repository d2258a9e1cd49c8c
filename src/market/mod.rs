//! Market quote module
//!
//! Read-only market quotes delivered by ingestion collaborators, plus the
//! Polymarket Gamma adapter used by the CLI.

mod gamma;

pub use gamma::{GammaClient, GammaConfig, GAMMA_API_URL};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A binary prediction-market quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
    /// Trading platform (e.g. "polymarket")
    pub platform: String,
    /// Platform-local market identifier
    pub market_id: String,
    /// Market question
    pub question: String,
    /// Current "yes" price as a probability
    pub price: Decimal,
    /// Traded volume in USD
    pub volume: Decimal,
    /// Available liquidity in USD
    pub liquidity: Decimal,
    /// Platform category, if any
    pub category: Option<String>,
    /// Scheduled resolution time
    pub resolution_date: Option<DateTime<Utc>>,
    /// Link to the market page
    pub url: Option<String>,
    /// When the quote was fetched
    pub fetched_at: DateTime<Utc>,
}

impl MarketQuote {
    /// Create a quote with zero volume/liquidity and no metadata
    pub fn new(
        platform: impl Into<String>,
        market_id: impl Into<String>,
        question: impl Into<String>,
        price: Decimal,
    ) -> Self {
        Self {
            platform: platform.into(),
            market_id: market_id.into(),
            question: question.into(),
            price,
            volume: Decimal::ZERO,
            liquidity: Decimal::ZERO,
            category: None,
            resolution_date: None,
            url: None,
            fetched_at: Utc::now(),
        }
    }

    /// Market identity used for opportunity upserts
    pub fn key(&self) -> String {
        market_key(&self.platform, &self.market_id)
    }
}

/// Render a market identity as `platform:market_id`
pub fn market_key(platform: &str, market_id: &str) -> String {
    format!("{}:{}", platform, market_id)
}

/// Filter for quote fetches
#[derive(Debug, Clone, Default)]
pub struct MarketQuery {
    pub category: Option<String>,
    pub limit: usize,
}

/// Trait for market quote collaborators
#[async_trait]
pub trait MarketSource: Send + Sync {
    /// Platform name reported in scan errors
    fn platform(&self) -> &str;
    /// Fetch current quotes
    async fn fetch_quotes(&self, query: &MarketQuery) -> anyhow::Result<Vec<MarketQuote>>;
}
