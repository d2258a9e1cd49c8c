//! Themes, assumptions, and uncertainty notes attached to a prediction

use super::{BaseRate, BaseRateSource};
use crate::factor::{extract_themes, terms};
use crate::market::MarketQuote;
use crate::normalize::WeightedArticle;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

const MAX_THEMES: usize = 5;
const THIN_COVERAGE: usize = 3;
const DIVIDED_DISPERSION: f64 = 0.4;
const LOW_CREDIBILITY_MIX: f64 = 0.5;
const FAR_RESOLUTION_DAYS: i64 = 180;
const THIN_LIQUIDITY_USD: i64 = 1000;

/// Heaviest recurring terms, question terms excluded
pub fn key_themes(
    question: &str,
    articles: &[WeightedArticle],
    scores: &[f64],
    min_mentions: usize,
) -> Vec<String> {
    extract_themes(articles, scores, &terms(question), min_mentions)
        .into_iter()
        .take(MAX_THEMES)
        .map(|t| t.term)
        .collect()
}

pub fn key_assumptions(base: &BaseRate, article_count: usize, from_cache: bool) -> Vec<String> {
    let mut assumptions = vec![
        "Market resolves Yes/No strictly on the stated question".to_string(),
        match &base.source {
            BaseRateSource::Category(category) => format!(
                "Historical resolution rate for {} questions ({:.0}%) is a fair prior",
                category,
                base.value * 100.0
            ),
            BaseRateSource::Blended(category) => format!(
                "Blend of the {} resolution rate and the market price ({:.0}%) is a fair prior",
                category,
                base.value * 100.0
            ),
            BaseRateSource::MarketPrice => format!(
                "Current market price ({:.0}%) is a reasonable uninformed prior",
                base.value * 100.0
            ),
            BaseRateSource::Uninformative => {
                "No category or market prior: starting from even odds".to_string()
            }
        },
    ];

    if article_count > 0 {
        assumptions.push("Source reputation and article age reflect information quality".to_string());
    }
    if from_cache {
        assumptions.push("Previously fetched coverage is still representative".to_string());
    }
    assumptions
}

/// Signals that should widen a reader's error bars
#[derive(Debug, Clone, Copy)]
pub struct UncertaintyInputs<'a> {
    pub articles: &'a [WeightedArticle],
    pub dispersion: f64,
    pub quote: Option<&'a MarketQuote>,
    pub from_cache: bool,
    pub as_of: DateTime<Utc>,
}

pub fn uncertainty_factors(inputs: &UncertaintyInputs<'_>) -> Vec<String> {
    let mut notes = Vec::new();
    let count = inputs.articles.len();

    if count == 0 {
        notes.push("No article coverage; estimate rests on the base rate".to_string());
    } else if count < THIN_COVERAGE {
        notes.push(format!("Thin coverage: only {} article(s)", count));
    }

    if inputs.dispersion > DIVIDED_DISPERSION {
        notes.push(format!(
            "Sentiment is divided across sources (dispersion {:.2})",
            inputs.dispersion
        ));
    }

    if count > 0 {
        let mean_credibility =
            inputs.articles.iter().map(|a| a.credibility).sum::<f64>() / count as f64;
        if mean_credibility < LOW_CREDIBILITY_MIX {
            notes.push(format!(
                "Coverage dominated by low-credibility sources (mean credibility {:.2})",
                mean_credibility
            ));
        }
    }

    if inputs.from_cache {
        notes.push("Evidence reused from an earlier fetch".to_string());
    }

    if let Some(quote) = inputs.quote {
        if let Some(resolution) = quote.resolution_date {
            let days = (resolution - inputs.as_of).num_days();
            if resolution < inputs.as_of {
                notes.push("Market is past its scheduled resolution date".to_string());
            } else if days > FAR_RESOLUTION_DAYS {
                notes.push(format!("Resolution is {} days away", days));
            }
        }
        if quote.liquidity < Decimal::from(THIN_LIQUIDITY_USD) {
            notes.push(format!("Thin market liquidity (${})", quote.liquidity.round_dp(0)));
        }
    }

    notes
}
