//! Factor decomposition module
//!
//! Extracts named, signed, explained probability shifts from the evidence.
//! Decomposers are pluggable; every decomposer's output passes through
//! [`bound`] before it reaches the estimator.

mod heuristic;
mod themes;

pub use heuristic::HeuristicDecomposer;
pub use themes::{extract_themes, terms, Theme};

use crate::config::FactorConfig;
use crate::normalize::WeightedArticle;
use crate::sentiment::SentimentReport;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A named probability-moving factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Factor {
    pub name: String,
    /// Signed shift in probability points, measured from even odds
    pub contribution: f64,
    /// Why the factor moved the estimate
    pub description: String,
}

impl Factor {
    pub fn new(name: impl Into<String>, contribution: f64, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contribution,
            description: description.into(),
        }
    }
}

/// Everything a decomposer may look at
#[derive(Debug, Clone, Copy)]
pub struct Evidence<'a> {
    pub articles: &'a [WeightedArticle],
    pub sentiment: &'a SentimentReport,
}

/// Trait for factor decomposition implementations
///
/// Implementations must return the same factors for the same inputs within a
/// scan. Model-backed decomposers should cache per question to honour this.
pub trait FactorDecomposer: Send + Sync {
    fn decompose(&self, question: &str, evidence: &Evidence<'_>) -> Vec<Factor>;

    /// Name recorded in the pipeline stage list
    fn name(&self) -> &str;
}

/// Clamp, rank, cap, and rescale factors
///
/// - non-finite contributions and empty names are dropped
/// - each contribution is clamped to `±max_contribution`
/// - factors are ordered by absolute contribution (name breaks ties)
/// - at most `max_factors` are kept
/// - the summed absolute contribution is scaled down to `max_total`
pub fn bound(factors: Vec<Factor>, config: &FactorConfig) -> Vec<Factor> {
    let cap = config.max_contribution.abs();

    let mut kept: Vec<Factor> = factors
        .into_iter()
        .filter(|f| f.contribution.is_finite() && !f.name.trim().is_empty())
        .map(|mut f| {
            f.contribution = f.contribution.clamp(-cap, cap);
            f
        })
        .filter(|f| f.contribution != 0.0)
        .collect();

    kept.sort_by(|a, b| {
        b.contribution
            .abs()
            .partial_cmp(&a.contribution.abs())
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    kept.truncate(config.max_factors);

    let total: f64 = kept.iter().map(|f| f.contribution.abs()).sum();
    let max_total = config.max_total.abs();
    if total > max_total && total > 0.0 {
        let scale = max_total / total;
        for factor in &mut kept {
            factor.contribution *= scale;
        }
    }

    kept
}
