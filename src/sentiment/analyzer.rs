//! Weighted sentiment aggregation

use super::{Lexicon, SentimentLabel, SentimentReport};
use crate::config::SentimentConfig;
use crate::normalize::WeightedArticle;

/// Pure sentiment stage: articles in, report out
#[derive(Debug, Clone)]
pub struct SentimentAnalyzer {
    lexicon: Lexicon,
    thresholds: SentimentConfig,
}

impl SentimentAnalyzer {
    pub fn new(thresholds: SentimentConfig) -> Self {
        Self {
            lexicon: Lexicon::new(),
            thresholds,
        }
    }

    /// Article pre-score when supplied, lexicon score otherwise
    pub fn article_score(&self, article: &WeightedArticle) -> f64 {
        match article.article.polarity {
            Some(p) if p.is_finite() => p.clamp(-1.0, 1.0),
            _ => self.lexicon.score(&article.article.text()),
        }
    }

    /// Bucket a score using the configured cut points
    pub fn label(&self, score: f64) -> SentimentLabel {
        let t = &self.thresholds;
        if score > t.very_positive {
            SentimentLabel::VeryPositive
        } else if score > t.positive {
            SentimentLabel::Positive
        } else if score < t.very_negative {
            SentimentLabel::VeryNegative
        } else if score < t.negative {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn analyze(&self, articles: &[WeightedArticle]) -> SentimentReport {
        if articles.is_empty() {
            return SentimentReport::neutral();
        }

        let article_scores: Vec<f64> = articles.iter().map(|a| self.article_score(a)).collect();

        let total_weight: f64 = articles.iter().map(WeightedArticle::weight).sum();
        if total_weight <= 0.0 {
            return SentimentReport {
                article_scores,
                ..SentimentReport::neutral()
            };
        }

        let score = articles
            .iter()
            .zip(&article_scores)
            .map(|(a, s)| a.weight() * s)
            .sum::<f64>()
            / total_weight;

        let variance = articles
            .iter()
            .zip(&article_scores)
            .map(|(a, s)| a.weight() * (s - score).powi(2))
            .sum::<f64>()
            / total_weight;

        let score = score.clamp(-1.0, 1.0);
        SentimentReport {
            label: self.label(score),
            article_scores,
            score,
            dispersion: variance.sqrt(),
        }
    }
}

impl Default for SentimentAnalyzer {
    fn default() -> Self {
        Self::new(SentimentConfig::default())
    }
}
