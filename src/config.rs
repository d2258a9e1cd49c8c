//! Configuration types for poly-alpha
//!
//! Every tunable table and threshold the pipeline uses lives here so that a
//! scan is reproducible from its config file alone.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub normalizer: NormalizerConfig,
    #[serde(default)]
    pub sentiment: SentimentConfig,
    #[serde(default)]
    pub factors: FactorConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Article weighting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// Source reputation table: lowercase source name or host -> credibility (0-1)
    pub reputation: HashMap<String, f64>,
    /// Credibility assigned to sources missing from the table
    pub default_credibility: f64,
    /// Age at which recency weight halves
    pub half_life_hours: f64,
    /// Recency weight never decays below this
    pub recency_floor: f64,
    /// Articles older than this are dropped
    pub max_article_age_hours: f64,
    /// Cap on articles kept per question
    pub max_articles: usize,
    /// Publish times this far in the future are treated as "now"; beyond it they are dropped
    pub future_skew_minutes: i64,
}

fn default_reputation() -> HashMap<String, f64> {
    [
        ("reuters", 0.95),
        ("associated press", 0.95),
        ("apnews.com", 0.95),
        ("bloomberg", 0.92),
        ("financial times", 0.90),
        ("ft.com", 0.90),
        ("wall street journal", 0.90),
        ("wsj.com", 0.90),
        ("the economist", 0.88),
        ("bbc news", 0.88),
        ("bbc.co.uk", 0.88),
        ("the new york times", 0.85),
        ("nytimes.com", 0.85),
        ("the washington post", 0.85),
        ("politico", 0.82),
        ("cnbc", 0.80),
        ("the guardian", 0.80),
        ("axios", 0.78),
        ("cnn", 0.72),
        ("yahoo finance", 0.70),
        ("coindesk", 0.70),
        ("the block", 0.68),
        ("fox news", 0.65),
        ("medium", 0.35),
        ("reddit", 0.30),
        ("x", 0.30),
        ("twitter", 0.30),
    ]
    .into_iter()
    .map(|(name, weight)| (name.to_string(), weight))
    .collect()
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            reputation: default_reputation(),
            default_credibility: 0.5,
            half_life_hours: 24.0,
            recency_floor: 0.1,
            max_article_age_hours: 24.0 * 30.0,
            max_articles: 50,
            future_skew_minutes: 10,
        }
    }
}

/// Sentiment label cut points
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SentimentConfig {
    pub very_positive: f64,
    pub positive: f64,
    pub negative: f64,
    pub very_negative: f64,
}

impl Default for SentimentConfig {
    fn default() -> Self {
        Self {
            very_positive: 0.3,
            positive: 0.1,
            negative: -0.1,
            very_negative: -0.3,
        }
    }
}

/// Factor decomposition bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FactorConfig {
    /// Maximum number of factors kept
    pub max_factors: usize,
    /// Per-factor contribution cap (probability points)
    pub max_contribution: f64,
    /// Cap on the summed absolute contribution
    pub max_total: f64,
    /// Mentions a theme needs across articles before it becomes a factor
    pub theme_min_mentions: usize,
}

impl Default for FactorConfig {
    fn default() -> Self {
        Self {
            max_factors: 8,
            max_contribution: 0.15,
            max_total: 0.35,
            theme_min_mentions: 2,
        }
    }
}

/// Bayesian estimator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Posterior is clamped to [epsilon, 1 - epsilon]
    pub epsilon: f64,
    /// Logit shift per unit of aggregate sentiment
    pub sentiment_weight: f64,
    /// Category -> historical resolution frequency
    pub base_rates: HashMap<String, f64>,
    /// Category -> keywords used to infer a category from question text
    pub category_keywords: HashMap<String, Vec<String>>,
    /// Weight of the category heuristic when a market price is also known
    pub base_rate_blend: f64,
    /// Maximum fraction of the evidence shift removed when evidence is scarce
    pub shrinkage_strength: f64,
    /// Evidence volume at which scarcity is one half
    pub scarcity_half_volume: f64,
    /// Shrinkage below this (in logit units) is not reported
    pub shrinkage_report_threshold: f64,
    /// Articles younger than this count as "very recent"
    pub recent_window_hours: f64,
    /// Share of evidence weight from very recent articles that triggers debiasing
    pub recent_share_threshold: f64,
    /// Multiplier applied to the factor shift when debiasing fires
    pub recency_discount: f64,
    pub min_confidence: f64,
    pub max_confidence: f64,
    /// Evidence volume scale of the confidence curve
    pub evidence_scale: f64,
    /// Confidence at or above this is Medium quality
    pub medium_quality: f64,
    /// Confidence at or above this is High quality
    pub high_quality: f64,
    /// Interval half-width at maximum confidence
    pub min_half_width: f64,
    /// Interval half-width at zero confidence
    pub max_half_width: f64,
}

fn default_base_rates() -> HashMap<String, f64> {
    [
        ("politics", 0.42),
        ("crypto", 0.38),
        ("sports", 0.50),
        ("economics", 0.45),
        ("science", 0.35),
    ]
    .into_iter()
    .map(|(category, rate)| (category.to_string(), rate))
    .collect()
}

fn default_category_keywords() -> HashMap<String, Vec<String>> {
    let table: [(&str, &[&str]); 5] = [
        (
            "politics",
            &["election", "president", "senate", "congress", "governor", "vote", "parliament"],
        ),
        ("crypto", &["bitcoin", "btc", "ethereum", "eth", "solana", "crypto", "token"]),
        ("sports", &["win the", "championship", "finals", "league", "cup", "match", "nba", "nfl"]),
        ("economics", &["fed", "rate cut", "inflation", "cpi", "gdp", "recession", "unemployment"]),
        ("science", &["nasa", "launch", "vaccine", "fda", "climate", "spacex"]),
    ];
    table
        .into_iter()
        .map(|(category, words)| {
            (
                category.to_string(),
                words.iter().map(|w| w.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.01,
            sentiment_weight: 0.6,
            base_rates: default_base_rates(),
            category_keywords: default_category_keywords(),
            base_rate_blend: 0.3,
            shrinkage_strength: 0.6,
            scarcity_half_volume: 3.0,
            shrinkage_report_threshold: 0.02,
            recent_window_hours: 6.0,
            recent_share_threshold: 0.6,
            recency_discount: 0.75,
            min_confidence: 0.1,
            max_confidence: 0.95,
            evidence_scale: 6.0,
            medium_quality: 0.4,
            high_quality: 0.7,
            min_half_width: 0.03,
            max_half_width: 0.25,
        }
    }
}

/// Edge scoring thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Below this confidence every market is Pass
    pub min_confidence: Decimal,
    /// Absolute edge needed for Buy/Sell
    pub buy_edge: Decimal,
    /// Absolute edge needed for Strong Buy/Strong Sell
    pub strong_edge: Decimal,
    /// Confidence needed for Strong Buy/Strong Sell
    pub strong_confidence: Decimal,
    /// Absolute edge above which an opportunity is flagged high-edge
    pub high_edge_threshold: Decimal,
    /// Fractional Kelly multiplier (e.g. 0.25 for quarter Kelly)
    pub kelly_multiplier: Decimal,
    /// Cap on the suggested stake as a fraction of bankroll
    pub max_position_pct: Decimal,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            min_confidence: dec!(0.3),
            buy_edge: dec!(0.03),
            strong_edge: dec!(0.10),
            strong_confidence: dec!(0.6),
            high_edge_threshold: dec!(0.10),
            kelly_multiplier: dec!(0.25),
            max_position_pct: dec!(0.05),
        }
    }
}

/// Scan orchestration configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Markets processed concurrently
    pub max_concurrency: usize,
    /// Timeout for a single source fetch
    pub fetch_timeout_secs: u64,
    /// Overall scan deadline
    pub deadline_secs: u64,
    /// Minimum absolute edge for creating an opportunity
    pub default_min_edge: Decimal,
    /// Articles requested per source per question
    pub article_limit: usize,
    /// How long a question's article set is kept as a cached prior
    pub cache_ttl_secs: u64,
}

impl ScanConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 8,
            fetch_timeout_secs: 10,
            deadline_secs: 120,
            default_min_edge: dec!(0.05),
            article_limit: 50,
            cache_ttl_secs: 3600,
        }
    }
}

/// External collaborator endpoints used by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Polymarket Gamma API base URL; empty disables the source
    pub gamma_url: String,
    /// News search endpoints
    pub news: Vec<NewsEndpointConfig>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            gamma_url: crate::market::GAMMA_API_URL.to_string(),
            news: Vec::new(),
        }
    }
}

/// A news search endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsEndpointConfig {
    pub name: String,
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// Scan archive configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub archive_enabled: bool,
    pub output_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            archive_enabled: false,
            output_dir: PathBuf::from("./data"),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
    /// Prometheus exporter port; metrics are not exported when unset
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_port: None,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format
    #[default]
    Pretty,
    /// JSON format for log aggregation
    Json,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
