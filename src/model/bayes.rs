//! Bayesian probability estimator
//!
//! Fuses a base-rate prior with sentiment and factor evidence in logit space:
//! posterior_logit = logit(prior) + keep * (Σ logit(0.5 + c_i) + w * sentiment)
//! where `keep` shrinks the evidence shift toward the prior when evidence is
//! scarce.

use super::{BaseRate, ConfidenceInterval, DataQuality};
use crate::config::EstimatorConfig;
use crate::factor::Factor;
use crate::normalize::WeightedArticle;
use crate::sentiment::SentimentReport;

/// Largest factor contribution fed to the logit shift (keeps 0.5 + c inside (0,1))
const MAX_SHIFT_CONTRIBUTION: f64 = 0.49;

/// Estimator output before narrative fields are attached
#[derive(Debug, Clone, PartialEq)]
pub struct Posterior {
    /// Prior after clamping to [epsilon, 1 - epsilon]
    pub base_rate: f64,
    pub probability: f64,
    pub interval: ConfidenceInterval,
    pub half_width: f64,
    pub confidence: f64,
    pub data_quality: DataQuality,
    pub bias_corrections: Vec<String>,
    /// Σ credibility x recency
    pub evidence_volume: f64,
}

pub fn logit(p: f64) -> f64 {
    (p / (1.0 - p)).ln()
}

pub fn expit(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Logit shift of a contribution measured from even odds
pub fn logit_shift(contribution: f64) -> f64 {
    logit(0.5 + contribution.clamp(-MAX_SHIFT_CONTRIBUTION, MAX_SHIFT_CONTRIBUTION))
}

/// Logit-space evidence fusion with bias corrections
#[derive(Debug, Clone)]
pub struct BayesianEstimator {
    config: EstimatorConfig,
}

impl BayesianEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    fn epsilon(&self) -> f64 {
        self.config.epsilon.clamp(1e-9, 0.49)
    }

    /// Increasing in evidence volume, from `min_confidence` toward `max_confidence`
    pub fn confidence(&self, evidence_volume: f64) -> f64 {
        let c = &self.config;
        let volume = evidence_volume.max(0.0);
        let scale = c.evidence_scale.max(f64::MIN_POSITIVE);
        let confidence = c.min_confidence + (c.max_confidence - c.min_confidence) * (1.0 - (-volume / scale).exp());
        confidence.clamp(0.0, 1.0)
    }

    pub fn data_quality(&self, confidence: f64) -> DataQuality {
        if confidence >= self.config.high_quality {
            DataQuality::High
        } else if confidence >= self.config.medium_quality {
            DataQuality::Medium
        } else {
            DataQuality::Low
        }
    }

    /// Interval half-width; narrows as confidence rises
    pub fn half_width(&self, confidence: f64) -> f64 {
        let c = &self.config;
        let hw = c.min_half_width + (c.max_half_width - c.min_half_width) * (1.0 - confidence.clamp(0.0, 1.0));
        hw.clamp(0.0, 0.5)
    }

    pub fn estimate(
        &self,
        base: &BaseRate,
        articles: &[WeightedArticle],
        sentiment: &SentimentReport,
        factors: &[Factor],
    ) -> Posterior {
        let c = &self.config;
        let eps = self.epsilon();
        let prior = if base.value.is_finite() {
            base.value.clamp(eps, 1.0 - eps)
        } else {
            0.5
        };

        let evidence_volume: f64 = articles.iter().map(WeightedArticle::weight).sum();
        let confidence = self.confidence(evidence_volume);
        let half_width = self.half_width(confidence);

        if articles.is_empty() || evidence_volume <= 0.0 {
            return Posterior {
                base_rate: prior,
                probability: prior,
                interval: ConfidenceInterval::around(prior, half_width),
                half_width,
                confidence,
                data_quality: self.data_quality(confidence),
                bias_corrections: Vec::new(),
                evidence_volume: evidence_volume.max(0.0),
            };
        }

        let mut corrections = Vec::new();

        let mut factor_shift: f64 = factors.iter().map(|f| logit_shift(f.contribution)).sum();
        let sentiment_shift = c.sentiment_weight * sentiment.score.clamp(-1.0, 1.0);

        // Recency debiasing
        let recent_weight: f64 = articles
            .iter()
            .filter(|a| a.age_hours <= c.recent_window_hours)
            .map(WeightedArticle::weight)
            .sum();
        let recent_share = recent_weight / evidence_volume;
        if recent_share > c.recent_share_threshold && factor_shift != 0.0 {
            factor_shift *= c.recency_discount;
            corrections.push(format!(
                "Recency debiasing: {:.0}% of evidence weight is under {}h old; factor shift scaled by {}",
                recent_share * 100.0,
                c.recent_window_hours,
                c.recency_discount
            ));
        }

        // Overconfidence shrinkage
        let shift = factor_shift + sentiment_shift;
        let k = c.scarcity_half_volume.max(0.0);
        let scarcity = if k > 0.0 { k / (k + evidence_volume) } else { 0.0 };
        let keep = (1.0 - c.shrinkage_strength.clamp(0.0, 1.0) * scarcity).clamp(0.0, 1.0);
        let removed = shift * (1.0 - keep);
        if removed.abs() > c.shrinkage_report_threshold {
            corrections.push(format!(
                "Overconfidence shrinkage: {:.0}% of the evidence shift pulled back toward the base rate (evidence volume {:.2})",
                (1.0 - keep) * 100.0,
                evidence_volume
            ));
        }

        let posterior_logit = logit(prior) + shift * keep;
        let probability = if posterior_logit.is_finite() {
            expit(posterior_logit).clamp(eps, 1.0 - eps)
        } else {
            prior
        };

        Posterior {
            base_rate: prior,
            probability,
            interval: ConfidenceInterval::around(probability, half_width),
            half_width,
            confidence,
            data_quality: self.data_quality(confidence),
            bias_corrections: corrections,
            evidence_volume,
        }
    }
}

impl Default for BayesianEstimator {
    fn default() -> Self {
        Self::new(EstimatorConfig::default())
    }
}
