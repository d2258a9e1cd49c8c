//! Sentiment analysis module
//!
//! Scores each weighted article and aggregates them into one labelled score

mod analyzer;
mod lexicon;

pub use analyzer::SentimentAnalyzer;
pub use lexicon::Lexicon;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete sentiment bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    #[serde(rename = "Very Positive")]
    VeryPositive,
    Positive,
    Neutral,
    Negative,
    #[serde(rename = "Very Negative")]
    VeryNegative,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SentimentLabel::VeryPositive => "Very Positive",
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
            SentimentLabel::VeryNegative => "Very Negative",
        };
        f.write_str(label)
    }
}

/// Sentiment stage output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    /// Polarity per article, in input order
    pub article_scores: Vec<f64>,
    /// Credibility x recency weighted mean (-1..1)
    pub score: f64,
    pub label: SentimentLabel,
    /// Weighted standard deviation of article scores
    pub dispersion: f64,
}

impl SentimentReport {
    /// Report for an empty article set
    pub fn neutral() -> Self {
        Self {
            article_scores: Vec::new(),
            score: 0.0,
            label: SentimentLabel::Neutral,
            dispersion: 0.0,
        }
    }
}
