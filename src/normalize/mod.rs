//! Data normalization module
//!
//! Assigns credibility and recency weights to articles and validates quotes

mod normalizer;
mod weights;

pub use normalizer::Normalizer;
pub use weights::{RecencyDecay, ReputationTable};

use crate::market::MarketQuote;
use crate::news::Article;
use serde::{Deserialize, Serialize};

/// An article with its derived weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedArticle {
    pub article: Article,
    /// Source reputation (0-1)
    pub credibility: f64,
    /// Age decay (floor-1)
    pub recency: f64,
    /// Age at normalization time
    pub age_hours: f64,
}

impl WeightedArticle {
    /// Combined evidence weight
    pub fn weight(&self) -> f64 {
        self.credibility * self.recency
    }
}

/// Normalizer output for one question
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    pub quote: Option<MarketQuote>,
    pub articles: Vec<WeightedArticle>,
    /// True when the articles came from the cached prior instead of this fetch
    pub from_cache: bool,
}

impl NormalizedInput {
    /// Base-rate-only input used when no evidence exists
    pub fn empty(quote: Option<MarketQuote>) -> Self {
        Self {
            quote,
            articles: Vec::new(),
            from_cache: false,
        }
    }

    /// Sum of credibility x recency over all articles
    pub fn evidence_volume(&self) -> f64 {
        self.articles.iter().map(WeightedArticle::weight).sum()
    }
}
