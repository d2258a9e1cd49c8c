//! Estimation pipeline and scoring properties

use chrono::{DateTime, Duration, TimeZone, Utc};
use poly_alpha::config::Config;
use poly_alpha::market::MarketQuote;
use poly_alpha::model::{ConfidenceInterval, DataQuality, PredictionResult};
use poly_alpha::news::Article;
use poly_alpha::scan::AnalysisPipeline;
use poly_alpha::signal::{EdgeScorer, RecommendedAction, Side};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

const QUESTION: &str = "Will the Senate confirm the nominee before December?";

fn as_of() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap()
}

fn pipeline() -> AnalysisPipeline {
    AnalysisPipeline::from_config(&Config::default())
}

fn coverage(count: i64) -> Vec<Article> {
    (0..count)
        .map(|i| {
            Article::new(
                ["Reuters", "Bloomberg", "Politico"][(i % 3) as usize],
                format!("Senators signal support for nominee, report {}", i),
                as_of() - Duration::hours(10 + i * 5),
            )
            .with_polarity(0.4)
        })
        .collect()
}

fn quote(price: Decimal) -> MarketQuote {
    MarketQuote::new("polymarket", "nominee", QUESTION, price)
}

/// A pipeline result with its posterior overridden
fn prediction_at(probability: f64, lower: f64, upper: f64, confidence: f64) -> PredictionResult {
    let q = quote(dec!(0.5));
    let mut prediction = pipeline()
        .analyze(QUESTION, Some(&q), &coverage(6), None, as_of())
        .unwrap();
    prediction.probability = probability;
    prediction.confidence_interval = ConfidenceInterval { lower, upper };
    prediction.confidence_score = confidence;
    prediction
}

#[test]
fn test_probability_bounds_hold_across_prices() {
    let p = pipeline();
    for price in [dec!(0.01), dec!(0.2), dec!(0.5), dec!(0.8), dec!(0.99)] {
        let q = quote(price);
        let result = p.analyze(QUESTION, Some(&q), &coverage(4), None, as_of()).unwrap();
        let ci = result.confidence_interval;
        assert!(0.0 <= ci.lower && ci.lower <= result.probability, "price {}", price);
        assert!(result.probability <= ci.upper && ci.upper <= 1.0, "price {}", price);

        let s = &result.scenarios;
        assert!(s.worst_case.probability <= s.base_case.probability);
        assert!(s.base_case.probability <= s.best_case.probability);
    }
}

#[test]
fn test_identical_inputs_give_identical_results() {
    let q = quote(dec!(0.45));
    let articles = coverage(5);
    let first = pipeline().analyze(QUESTION, Some(&q), &articles, None, as_of()).unwrap();
    let second = pipeline().analyze(QUESTION, Some(&q), &articles, None, as_of()).unwrap();
    assert_eq!(first.without_timing(), second.without_timing());
}

#[test]
fn test_more_evidence_never_lowers_confidence() {
    let p = pipeline();
    let q = quote(dec!(0.45));
    let mut previous = 0.0;
    for count in 0..10 {
        let result = p
            .analyze(QUESTION, Some(&q), &coverage(count), None, as_of())
            .unwrap();
        assert!(
            result.confidence_score >= previous,
            "confidence fell at {} articles",
            count
        );
        previous = result.confidence_score;
    }
}

#[test]
fn test_zero_articles_use_base_rate_with_low_quality() {
    let q = quote(dec!(0.62));
    let result = pipeline().analyze(QUESTION, Some(&q), &[], None, as_of()).unwrap();
    assert_eq!(result.probability, result.base_rate);
    assert_eq!(result.data_quality, DataQuality::Low);
    assert!(result
        .uncertainty_factors
        .iter()
        .any(|u| u.starts_with("No article coverage")));
}

#[test]
fn test_underpriced_market_is_a_buy() {
    let prediction = prediction_at(0.55, 0.45, 0.65, 0.8);
    let opportunity = EdgeScorer::default().score(&prediction, &quote(dec!(0.40)), as_of());

    assert_eq!(opportunity.edge, dec!(0.15));
    assert_eq!(opportunity.edge, opportunity.estimated_probability - opportunity.market_price);
    assert!(opportunity.high_edge);
    assert!(matches!(
        opportunity.recommended_action,
        RecommendedAction::Buy | RecommendedAction::StrongBuy
    ));
    assert_eq!(opportunity.side, Some(Side::Yes));
}

#[test]
fn test_overpriced_market_is_a_sell() {
    let prediction = prediction_at(0.30, 0.20, 0.40, 0.8);
    let opportunity = EdgeScorer::default().score(&prediction, &quote(dec!(0.90)), as_of());

    assert_eq!(opportunity.edge, dec!(-0.60));
    assert!(matches!(
        opportunity.recommended_action,
        RecommendedAction::Sell | RecommendedAction::StrongSell
    ));
    assert_eq!(opportunity.side, Some(Side::No));
    assert!(opportunity.kelly_fraction >= Decimal::ZERO);
    assert!(opportunity.kelly_fraction <= Decimal::ONE);
    assert!(opportunity.suggested_stake_fraction <= dec!(0.05));
}
