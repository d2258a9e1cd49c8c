//! Article weighting and quote validation

use super::{NormalizedInput, RecencyDecay, ReputationTable, WeightedArticle};
use crate::config::NormalizerConfig;
use crate::error::{EngineError, Result};
use crate::market::MarketQuote;
use crate::news::Article;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Turns raw articles and quotes into weighted, validated pipeline input
#[derive(Debug, Clone)]
pub struct Normalizer {
    reputation: ReputationTable,
    decay: RecencyDecay,
    max_age_hours: f64,
    max_articles: usize,
    future_skew: Duration,
}

impl Normalizer {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            reputation: ReputationTable::from_config(config),
            decay: RecencyDecay::from_config(config),
            max_age_hours: config.max_article_age_hours,
            max_articles: config.max_articles,
            future_skew: Duration::minutes(config.future_skew_minutes),
        }
    }

    /// Reject questions the pipeline cannot reason about
    pub fn validate_question(question: &str) -> Result<()> {
        if question.trim().is_empty() {
            return Err(EngineError::InvalidInput("empty question".to_string()));
        }
        Ok(())
    }

    /// Reject malformed quotes
    pub fn validate_quote(quote: &MarketQuote) -> Result<()> {
        Self::validate_question(&quote.question)
            .map_err(|_| EngineError::InvalidInput(format!("market {} has no question", quote.key())))?;

        if quote.market_id.trim().is_empty() || quote.platform.trim().is_empty() {
            return Err(EngineError::InvalidInput(format!(
                "market identity incomplete: {:?}",
                quote.key()
            )));
        }
        if quote.price <= Decimal::ZERO || quote.price >= Decimal::ONE {
            return Err(EngineError::InvalidInput(format!(
                "market {} price {} outside (0, 1)",
                quote.key(),
                quote.price
            )));
        }
        if quote.volume < Decimal::ZERO || quote.liquidity < Decimal::ZERO {
            return Err(EngineError::InvalidInput(format!(
                "market {} has negative volume or liquidity",
                quote.key()
            )));
        }
        Ok(())
    }

    /// Weight one article; returns None when it is unusable
    pub fn weigh(&self, article: &Article, as_of: DateTime<Utc>) -> Option<WeightedArticle> {
        if article.headline.trim().is_empty() && article.body.trim().is_empty() {
            return None;
        }
        if article.published_at > as_of + self.future_skew {
            return None;
        }

        let age_hours = ((as_of - article.published_at).num_seconds() as f64 / 3600.0).max(0.0);
        if age_hours > self.max_age_hours {
            return None;
        }

        Some(WeightedArticle {
            credibility: self
                .reputation
                .credibility(&article.source, article.url.as_deref()),
            recency: self.decay.weight(age_hours),
            age_hours,
            article: article.clone(),
        })
    }

    /// Weight a batch: drop unusable and duplicate articles, keep the heaviest
    pub fn weigh_all(&self, articles: &[Article], as_of: DateTime<Utc>) -> Vec<WeightedArticle> {
        let mut weighted: Vec<WeightedArticle> = articles
            .iter()
            .filter_map(|a| self.weigh(a, as_of))
            .collect();

        weighted.sort_by(|a, b| {
            b.weight()
                .partial_cmp(&a.weight())
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.article.published_at.cmp(&a.article.published_at))
                .then_with(|| a.article.headline.cmp(&b.article.headline))
        });

        // Sorted heaviest first, so the first copy of a duplicate is the one kept
        let mut seen = HashSet::new();
        weighted.retain(|w| {
            seen.insert((
                w.article.source.trim().to_lowercase(),
                w.article.headline.trim().to_lowercase(),
            ))
        });
        weighted.truncate(self.max_articles);
        weighted
    }

    /// Produce pipeline input for one question
    ///
    /// Fails with `InsufficientData` only when neither the fresh articles nor
    /// the cached set contain a usable article.
    pub fn normalize(
        &self,
        question: &str,
        quote: Option<&MarketQuote>,
        articles: &[Article],
        cached: Option<&[Article]>,
        as_of: DateTime<Utc>,
    ) -> Result<NormalizedInput> {
        Self::validate_question(question)?;
        if let Some(quote) = quote {
            Self::validate_quote(quote)?;
        }

        let fresh = self.weigh_all(articles, as_of);
        if !fresh.is_empty() {
            return Ok(NormalizedInput {
                quote: quote.cloned(),
                articles: fresh,
                from_cache: false,
            });
        }

        let cached = cached.map(|c| self.weigh_all(c, as_of)).unwrap_or_default();
        if cached.is_empty() {
            return Err(EngineError::InsufficientData {
                question: question.to_string(),
            });
        }

        tracing::debug!(question = %question, count = cached.len(), "Using cached articles");
        Ok(NormalizedInput {
            quote: quote.cloned(),
            articles: cached,
            from_cache: true,
        })
    }
}
