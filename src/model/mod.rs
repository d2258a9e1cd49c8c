//! Probability model module
//!
//! Turns base rates and weighted evidence into a posterior probability with a
//! confidence interval, scenarios, and an audit trail

mod base_rate;
mod bayes;
mod context;
mod scenario;

pub use base_rate::{BaseRate, BaseRateSource, BaseRateTable};
pub use bayes::{expit, logit, logit_shift, BayesianEstimator, Posterior};
pub use context::{key_assumptions, key_themes, uncertainty_factors, UncertaintyInputs};
pub use scenario::ScenarioGenerator;

use crate::factor::Factor;
use crate::sentiment::SentimentLabel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Categorical confidence label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataQuality {
    Low,
    Medium,
    High,
}

/// 95% interval around the posterior
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    /// `[p - hw, p + hw]` intersected with [0,1]
    pub fn around(probability: f64, half_width: f64) -> Self {
        let hw = half_width.abs();
        Self {
            lower: (probability - hw).max(0.0).min(probability),
            upper: (probability + hw).min(1.0).max(probability),
        }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// One outcome scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub probability: f64,
    pub description: String,
}

/// Best/base/worst outcomes; worst <= base <= best
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub best_case: Scenario,
    pub base_case: Scenario,
    pub worst_case: Scenario,
}

/// When and how long the analysis ran
///
/// Excluded from idempotence comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineTiming {
    pub analyzed_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Full output of the estimation pipeline for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub question: String,
    pub probability: f64,
    pub confidence_interval: ConfidenceInterval,
    pub base_rate: f64,
    pub base_rate_source: BaseRateSource,
    pub confidence_score: f64,
    pub data_quality: DataQuality,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
    pub factors: Vec<Factor>,
    pub key_themes: Vec<String>,
    pub key_assumptions: Vec<String>,
    pub uncertainty_factors: Vec<String>,
    pub bias_corrections: Vec<String>,
    pub scenarios: ScenarioSet,
    pub pipeline_stages: Vec<String>,
    pub article_count: usize,
    pub evidence_volume: f64,
    /// Distinct article sources, sorted
    pub data_sources: Vec<String>,
    pub timing: PipelineTiming,
}

impl PredictionResult {
    /// Copy with timing metadata cleared, for comparing two runs
    pub fn without_timing(&self) -> Self {
        Self {
            timing: PipelineTiming {
                analyzed_at: DateTime::<Utc>::default(),
                elapsed_ms: 0,
            },
            ..self.clone()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_intersected_with_unit_range() {
        let ci = ConfidenceInterval::around(0.02, 0.1);
        assert_eq!(ci.lower, 0.0);
        assert!((ci.upper - 0.12).abs() < 1e-12);

        let ci = ConfidenceInterval::around(0.95, 0.1);
        assert_eq!(ci.upper, 1.0);
        assert!((ci.lower - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_data_quality_serializes_as_title_case() {
        assert_eq!(serde_json::to_string(&DataQuality::Low).unwrap(), "\"Low\"");
        assert_eq!(serde_json::to_string(&DataQuality::High).unwrap(), "\"High\"");
    }
}
