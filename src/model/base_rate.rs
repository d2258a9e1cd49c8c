//! Base-rate priors

use crate::config::EstimatorConfig;
use crate::market::MarketQuote;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Where a prior came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category", rename_all = "snake_case")]
pub enum BaseRateSource {
    /// Historical resolution frequency for the category
    Category(String),
    /// Category heuristic blended with the market price
    Blended(String),
    /// The market's own price as an uninformative prior
    MarketPrice,
    /// Even odds: no category and no market
    Uninformative,
}

/// A prior probability and its provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseRate {
    pub value: f64,
    pub source: BaseRateSource,
}

/// Category heuristics used to seed the estimator
#[derive(Debug, Clone)]
pub struct BaseRateTable {
    rates: BTreeMap<String, f64>,
    keywords: BTreeMap<String, Vec<String>>,
    blend: f64,
}

impl BaseRateTable {
    pub fn from_config(config: &EstimatorConfig) -> Self {
        Self {
            rates: config
                .base_rates
                .iter()
                .map(|(k, v)| (k.to_lowercase(), v.clamp(0.0, 1.0)))
                .collect(),
            keywords: config
                .category_keywords
                .iter()
                .map(|(k, words)| {
                    (
                        k.to_lowercase(),
                        words.iter().map(|w| w.to_lowercase()).collect(),
                    )
                })
                .collect(),
            blend: config.base_rate_blend.clamp(0.0, 1.0),
        }
    }

    /// Category with a known rate: the quote's own, else the best keyword match
    pub fn category_for(&self, question: &str, quote_category: Option<&str>) -> Option<String> {
        if let Some(category) = quote_category.map(str::to_lowercase) {
            if self.rates.contains_key(&category) {
                return Some(category);
            }
        }

        let lower = question.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();

        // BTreeMap iteration keeps ties deterministic (alphabetical)
        let mut best: Option<(&String, usize)> = None;
        for (category, words) in &self.keywords {
            if !self.rates.contains_key(category) {
                continue;
            }
            let hits = words
                .iter()
                .filter(|w| {
                    if w.contains(' ') {
                        lower.contains(w.as_str())
                    } else {
                        tokens.contains(&w.as_str())
                    }
                })
                .count();
            if hits > 0 && best.map_or(true, |(_, h)| hits > h) {
                best = Some((category, hits));
            }
        }
        best.map(|(category, _)| category.clone())
    }

    /// Prior for a question, optionally anchored on a market quote
    pub fn base_rate(&self, question: &str, quote: Option<&MarketQuote>) -> BaseRate {
        let category = self.category_for(question, quote.and_then(|q| q.category.as_deref()));
        let heuristic = category
            .as_ref()
            .and_then(|c| self.rates.get(c).map(|rate| (c.clone(), *rate)));
        let market = quote.and_then(|q| f64::try_from(q.price).ok());

        match (heuristic, market) {
            (Some((category, rate)), Some(price)) => BaseRate {
                value: self.blend * rate + (1.0 - self.blend) * price,
                source: BaseRateSource::Blended(category),
            },
            (Some((category, rate)), None) => BaseRate {
                value: rate,
                source: BaseRateSource::Category(category),
            },
            (None, Some(price)) => BaseRate {
                value: price,
                source: BaseRateSource::MarketPrice,
            },
            (None, None) => BaseRate {
                value: 0.5,
                source: BaseRateSource::Uninformative,
            },
        }
    }
}
