//! Gamma API client for market quotes
//!
//! Fetches active Polymarket markets and maps them to [`MarketQuote`]s.

use super::{MarketQuery, MarketQuote, MarketSource};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

/// Gamma API base URL
pub const GAMMA_API_URL: &str = "https://gamma-api.polymarket.com";

const EVENT_URL_PREFIX: &str = "https://polymarket.com/event/";

/// Configuration for the Gamma client
#[derive(Debug, Clone)]
pub struct GammaConfig {
    /// Base URL for the Gamma API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for GammaConfig {
    fn default() -> Self {
        Self {
            base_url: GAMMA_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for Polymarket's Gamma API
pub struct GammaClient {
    config: GammaConfig,
    client: Client,
}

impl GammaClient {
    /// Create a new Gamma API client with default configuration
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(GammaConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: GammaConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Fetch active markets ordered by 24h volume
    pub async fn fetch_active_markets(&self, query: &MarketQuery) -> anyhow::Result<Vec<MarketQuote>> {
        let url = format!("{}/markets", self.config.base_url);
        let limit = query.limit.max(1).to_string();

        tracing::debug!(url = %url, limit = %limit, category = ?query.category, "Fetching markets from Gamma API");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("active", "true"),
                ("closed", "false"),
                ("order", "volume24hr"),
                ("ascending", "false"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gamma API error: {} - {}", status, body);
        }

        let gamma_markets: Vec<GammaMarket> = response.json().await?;
        let fetched_at = Utc::now();

        let quotes: Vec<MarketQuote> = gamma_markets
            .into_iter()
            .filter(|m| matches_category(m, query.category.as_deref()))
            .filter_map(|m| convert_to_quote(m, fetched_at))
            .collect();

        tracing::info!(market_count = quotes.len(), "Fetched Gamma market quotes");

        Ok(quotes)
    }
}

#[async_trait]
impl MarketSource for GammaClient {
    fn platform(&self) -> &str {
        "polymarket"
    }

    async fn fetch_quotes(&self, query: &MarketQuery) -> anyhow::Result<Vec<MarketQuote>> {
        self.fetch_active_markets(query).await
    }
}

/// Raw market response from Gamma API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GammaMarket {
    id: String,
    question: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    category: Option<String>,
    /// Outcome prices as JSON string
    #[serde(default)]
    outcome_prices: Option<String>,
    #[serde(default)]
    volume_num: Option<f64>,
    #[serde(default)]
    liquidity_num: Option<f64>,
    #[serde(default)]
    end_date: Option<String>,
}

fn matches_category(market: &GammaMarket, category: Option<&str>) -> bool {
    match category {
        None => true,
        Some(wanted) => market
            .category
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case(wanted)),
    }
}

/// Convert a GammaMarket to a quote; markets without a usable price are skipped
fn convert_to_quote(gamma: GammaMarket, fetched_at: DateTime<Utc>) -> Option<MarketQuote> {
    let price = gamma.outcome_prices.as_deref().and_then(parse_outcome_price)?;

    let resolution_date = gamma
        .end_date
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    Some(MarketQuote {
        platform: "polymarket".to_string(),
        market_id: gamma.id,
        question: gamma.question,
        price,
        volume: to_decimal(gamma.volume_num),
        liquidity: to_decimal(gamma.liquidity_num),
        category: gamma.category.map(|c| c.to_lowercase()),
        resolution_date,
        url: gamma.slug.map(|slug| format!("{}{}", EVENT_URL_PREFIX, slug)),
        fetched_at,
    })
}

fn to_decimal(value: Option<f64>) -> Decimal {
    value
        .and_then(|v| Decimal::try_from(v).ok())
        .map(|d| d.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

/// Parse outcome price from JSON string
///
/// Format: "[\"0.52\", \"0.48\"]" - returns the first price (YES price)
fn parse_outcome_price(prices_str: &str) -> Option<Decimal> {
    let prices: Vec<String> = serde_json::from_str(prices_str).ok()?;
    prices.first().and_then(|p| Decimal::from_str(p).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn gamma_market(category: Option<&str>, prices: Option<&str>) -> GammaMarket {
        GammaMarket {
            id: "512340".to_string(),
            question: "Will the Fed cut rates in December?".to_string(),
            slug: Some("fed-cut-december".to_string()),
            category: category.map(String::from),
            outcome_prices: prices.map(String::from),
            volume_num: Some(125_000.456),
            liquidity_num: Some(8_000.0),
            end_date: Some("2026-12-10T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_gamma_config_default() {
        let config = GammaConfig::default();
        assert_eq!(config.base_url, GAMMA_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_gamma_client_custom() {
        let config = GammaConfig {
            base_url: "https://test.example.com".to_string(),
            timeout: Duration::from_secs(30),
        };
        let client = GammaClient::with_config(config).unwrap();
        assert_eq!(client.config.base_url, "https://test.example.com");
        assert_eq!(client.platform(), "polymarket");
    }

    #[test]
    fn test_parse_outcome_price() {
        assert_eq!(parse_outcome_price(r#"["0.52", "0.48"]"#), Some(dec!(0.52)));
        assert!(parse_outcome_price("not json").is_none());
        assert!(parse_outcome_price("[]").is_none());
    }

    #[test]
    fn test_convert_to_quote() {
        let now = Utc::now();
        let quote = convert_to_quote(gamma_market(Some("Economics"), Some(r#"["0.31", "0.69"]"#)), now)
            .unwrap();

        assert_eq!(quote.platform, "polymarket");
        assert_eq!(quote.market_id, "512340");
        assert_eq!(quote.price, dec!(0.31));
        assert_eq!(quote.volume, dec!(125000.46));
        assert_eq!(quote.liquidity, dec!(8000));
        assert_eq!(quote.category.as_deref(), Some("economics"));
        assert_eq!(
            quote.url.as_deref(),
            Some("https://polymarket.com/event/fed-cut-december")
        );
        assert!(quote.resolution_date.is_some());
        assert_eq!(quote.fetched_at, now);
    }

    #[test]
    fn test_convert_to_quote_without_price() {
        assert!(convert_to_quote(gamma_market(None, None), Utc::now()).is_none());
    }

    #[test]
    fn test_matches_category() {
        let market = gamma_market(Some("Politics"), None);
        assert!(matches_category(&market, None));
        assert!(matches_category(&market, Some("politics")));
        assert!(!matches_category(&market, Some("crypto")));
        assert!(!matches_category(&gamma_market(None, None), Some("politics")));
    }
}
