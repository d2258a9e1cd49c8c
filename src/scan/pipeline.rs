//! Per-question analysis pipeline
//!
//! normalize -> sentiment -> factors -> Bayesian estimate -> scenarios.
//! Every stage is a pure function of its inputs and `as_of`, so two runs over
//! the same inputs produce the same result apart from timing metadata.

use crate::config::{Config, FactorConfig};
use crate::error::{EngineError, Result};
use crate::factor::{self, Evidence, FactorDecomposer, HeuristicDecomposer};
use crate::market::MarketQuote;
use crate::model::{
    key_assumptions, key_themes, uncertainty_factors, BaseRateTable, BayesianEstimator,
    PipelineTiming, PredictionResult, ScenarioGenerator, UncertaintyInputs,
};
use crate::news::Article;
use crate::normalize::{NormalizedInput, Normalizer};
use crate::sentiment::SentimentAnalyzer;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

const STAGE_NORMALIZE: &str = "normalize";
const STAGE_BASE_RATE_ONLY: &str = "base_rate_fallback";
const STAGE_SENTIMENT: &str = "sentiment_analysis";
const STAGE_ESTIMATE: &str = "bayesian_estimation";
const STAGE_BIAS: &str = "bias_correction";
const STAGE_SCENARIOS: &str = "scenario_analysis";

/// The estimation stages for one question
pub struct AnalysisPipeline {
    normalizer: Normalizer,
    sentiment: SentimentAnalyzer,
    decomposer: Arc<dyn FactorDecomposer>,
    factor_config: FactorConfig,
    base_rates: BaseRateTable,
    estimator: BayesianEstimator,
    scenarios: ScenarioGenerator,
}

impl AnalysisPipeline {
    /// Pipeline with the heuristic factor decomposer
    pub fn from_config(config: &Config) -> Self {
        Self {
            normalizer: Normalizer::new(&config.normalizer),
            sentiment: SentimentAnalyzer::new(config.sentiment.clone()),
            decomposer: Arc::new(HeuristicDecomposer::new(&config.factors)),
            factor_config: config.factors.clone(),
            base_rates: BaseRateTable::from_config(&config.estimator),
            estimator: BayesianEstimator::new(config.estimator.clone()),
            scenarios: ScenarioGenerator::new(),
        }
    }

    /// Swap the factor decomposition strategy
    pub fn with_decomposer(mut self, decomposer: Arc<dyn FactorDecomposer>) -> Self {
        self.decomposer = decomposer;
        self
    }

    pub fn decomposer_name(&self) -> &str {
        self.decomposer.name()
    }

    /// Run every stage for one question
    ///
    /// Fails only with `InvalidInput`. Missing evidence degrades to a
    /// base-rate-only estimate.
    pub fn analyze(
        &self,
        question: &str,
        quote: Option<&MarketQuote>,
        articles: &[Article],
        cached: Option<&[Article]>,
        as_of: DateTime<Utc>,
    ) -> Result<PredictionResult> {
        let started = Instant::now();
        let mut stages = vec![STAGE_NORMALIZE.to_string()];

        let input = match self.normalizer.normalize(question, quote, articles, cached, as_of) {
            Ok(input) => input,
            Err(EngineError::InsufficientData { .. }) => {
                tracing::debug!(question = %question, "No usable articles, estimating from base rate");
                stages.push(STAGE_BASE_RATE_ONLY.to_string());
                NormalizedInput::empty(quote.cloned())
            }
            Err(e) => return Err(e),
        };

        let sentiment = self.sentiment.analyze(&input.articles);
        let factors = if input.articles.is_empty() {
            Vec::new()
        } else {
            stages.push(STAGE_SENTIMENT.to_string());
            let evidence = Evidence {
                articles: &input.articles,
                sentiment: &sentiment,
            };
            let raw = self.decomposer.decompose(question, &evidence);
            stages.push(self.decomposer.name().to_string());
            factor::bound(raw, &self.factor_config)
        };

        let base = self.base_rates.base_rate(question, input.quote.as_ref());
        let posterior = self.estimator.estimate(&base, &input.articles, &sentiment, &factors);
        stages.push(STAGE_ESTIMATE.to_string());
        if !posterior.bias_corrections.is_empty() {
            stages.push(STAGE_BIAS.to_string());
        }

        let scenarios = self
            .scenarios
            .generate(posterior.probability, posterior.half_width, &factors);
        stages.push(STAGE_SCENARIOS.to_string());

        let data_sources: BTreeSet<String> = input
            .articles
            .iter()
            .map(|a| a.article.source.clone())
            .collect();

        let uncertainty = uncertainty_factors(&UncertaintyInputs {
            articles: &input.articles,
            dispersion: sentiment.dispersion,
            quote: input.quote.as_ref(),
            from_cache: input.from_cache,
            as_of,
        });

        let result = PredictionResult {
            question: question.trim().to_string(),
            probability: posterior.probability,
            confidence_interval: posterior.interval,
            base_rate: posterior.base_rate,
            base_rate_source: base.source.clone(),
            confidence_score: posterior.confidence,
            data_quality: posterior.data_quality,
            sentiment_score: sentiment.score,
            sentiment_label: sentiment.label,
            key_themes: key_themes(
                question,
                &input.articles,
                &sentiment.article_scores,
                self.factor_config.theme_min_mentions,
            ),
            key_assumptions: key_assumptions(&base, input.articles.len(), input.from_cache),
            uncertainty_factors: uncertainty,
            bias_corrections: posterior.bias_corrections,
            factors,
            scenarios,
            pipeline_stages: stages,
            article_count: input.articles.len(),
            evidence_volume: posterior.evidence_volume,
            data_sources: data_sources.into_iter().collect(),
            timing: PipelineTiming {
                analyzed_at: as_of,
                elapsed_ms: started.elapsed().as_millis() as u64,
            },
        };

        tracing::debug!(
            question = %result.question,
            probability = result.probability,
            confidence = result.confidence_score,
            articles = result.article_count,
            "Analysis complete"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factor::Factor;
    use crate::model::{BaseRateSource, DataQuality};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn as_of() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
    }

    fn pipeline() -> AnalysisPipeline {
        AnalysisPipeline::from_config(&Config::default())
    }

    fn quote(price: rust_decimal::Decimal) -> MarketQuote {
        MarketQuote::new("polymarket", "m1", "Will the launch happen this year?", price)
    }

    fn articles() -> Vec<Article> {
        vec![
            Article::new("Reuters", "Launch on track after successful test", as_of() - Duration::hours(20))
                .with_polarity(0.6),
            Article::new("Bloomberg", "Engineers confirm launch readiness", as_of() - Duration::hours(30))
                .with_polarity(0.5),
            Article::new("Reddit", "Rumours of launch delay", as_of() - Duration::hours(10))
                .with_polarity(-0.2),
        ]
    }

    struct FixedDecomposer(Vec<Factor>);

    impl FactorDecomposer for FixedDecomposer {
        fn decompose(&self, _question: &str, _evidence: &Evidence<'_>) -> Vec<Factor> {
            self.0.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    #[test]
    fn test_zero_articles_fall_back_to_base_rate() {
        let q = quote(dec!(0.35));
        let result = pipeline()
            .analyze(&q.question, Some(&q), &[], None, as_of())
            .unwrap();

        assert_eq!(result.probability, result.base_rate);
        assert_eq!(result.data_quality, DataQuality::Low);
        assert!(result.factors.is_empty());
        assert_eq!(result.article_count, 0);
        assert!(result.pipeline_stages.contains(&"base_rate_fallback".to_string()));
    }

    #[test]
    fn test_invalid_quote_is_rejected() {
        let q = quote(dec!(1.2));
        let err = pipeline()
            .analyze(&q.question, Some(&q), &articles(), None, as_of())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput(_)));
    }

    #[test]
    fn test_full_pipeline_invariants() {
        let q = quote(dec!(0.40));
        let result = pipeline()
            .analyze(&q.question, Some(&q), &articles(), None, as_of())
            .unwrap();

        let ci = result.confidence_interval;
        assert!(0.0 <= ci.lower && ci.lower <= result.probability);
        assert!(result.probability <= ci.upper && ci.upper <= 1.0);
        let s = &result.scenarios;
        assert!(s.worst_case.probability <= s.base_case.probability);
        assert!(s.base_case.probability <= s.best_case.probability);
        assert_eq!(result.article_count, 3);
        assert_eq!(result.data_sources, vec!["Bloomberg", "Reddit", "Reuters"]);
        assert_eq!(result.pipeline_stages.first().map(String::as_str), Some("normalize"));
        assert_eq!(
            result.pipeline_stages.last().map(String::as_str),
            Some("scenario_analysis")
        );
        assert!(result
            .pipeline_stages
            .contains(&"heuristic_factor_decomposition".to_string()));
    }

    #[test]
    fn test_repeat_runs_are_identical() {
        let q = quote(dec!(0.40));
        let p = pipeline();
        let a = p.analyze(&q.question, Some(&q), &articles(), None, as_of()).unwrap();
        let b = p.analyze(&q.question, Some(&q), &articles(), None, as_of()).unwrap();
        assert_eq!(a.without_timing(), b.without_timing());
    }

    #[test]
    fn test_injected_decomposer_is_bounded() {
        let q = quote(dec!(0.40));
        let p = pipeline().with_decomposer(Arc::new(FixedDecomposer(vec![
            Factor::new("huge", 0.9, "x"),
            Factor::new("nan", f64::NAN, "x"),
        ])));
        let result = p.analyze(&q.question, Some(&q), &articles(), None, as_of()).unwrap();

        assert_eq!(result.factors.len(), 1);
        assert_eq!(result.factors[0].contribution, 0.15);
        assert!(result.pipeline_stages.contains(&"fixed".to_string()));
    }

    #[test]
    fn test_cached_articles_used_when_fetch_is_empty() {
        let q = quote(dec!(0.40));
        let cached = articles();
        let result = pipeline()
            .analyze(&q.question, Some(&q), &[], Some(&cached), as_of())
            .unwrap();
        assert_eq!(result.article_count, 3);
        assert!(result
            .uncertainty_factors
            .iter()
            .any(|u| u.starts_with("Evidence reused")));
    }

    #[test]
    fn test_adhoc_question_without_category_starts_at_even_odds() {
        let result = pipeline()
            .analyze("Will the ethics board meet?", None, &[], None, as_of())
            .unwrap();
        assert_eq!(result.base_rate_source, BaseRateSource::Uninformative);
        assert_eq!(result.probability, 0.5);
    }
}
