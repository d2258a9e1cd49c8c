//! Edge / Kelly opportunity scoring

use super::{Opportunity, OpportunityStatus, RecommendedAction, Side};
use crate::config::ScoringConfig;
use crate::market::MarketQuote;
use crate::model::PredictionResult;
use crate::risk::{risk_factors, KellyCalculator};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

/// Decimal places kept on the posterior at the scoring boundary
const PROBABILITY_DP: u32 = 4;
const DRIVERS_IN_REASONING: usize = 3;

/// Compares a posterior against the market and sizes the bet
#[derive(Debug, Clone)]
pub struct EdgeScorer {
    config: ScoringConfig,
    kelly: KellyCalculator,
}

impl EdgeScorer {
    pub fn new(config: ScoringConfig) -> Self {
        let kelly = KellyCalculator::new(config.kelly_multiplier, config.max_position_pct);
        Self { config, kelly }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Posterior as a Decimal, rounded so that edge arithmetic is exact
    pub fn to_probability(value: f64) -> Decimal {
        Decimal::try_from(value.clamp(0.0, 1.0))
            .unwrap_or(Decimal::ZERO)
            .round_dp(PROBABILITY_DP)
    }

    /// Expected profit per $1 staked on the side the edge favours
    ///
    /// - edge >= 0, buy Yes at m: p / m - 1
    /// - edge < 0, buy No at 1 - m: (1 - p) / (1 - m) - 1
    pub fn expected_value(probability: Decimal, market_price: Decimal) -> Decimal {
        if market_price <= Decimal::ZERO || market_price >= Decimal::ONE {
            return Decimal::ZERO;
        }
        let edge = probability - market_price;
        let ev = if edge >= Decimal::ZERO {
            probability / market_price - Decimal::ONE
        } else {
            (Decimal::ONE - probability) / (Decimal::ONE - market_price) - Decimal::ONE
        };
        ev.round_dp(PROBABILITY_DP)
    }

    /// Action from the configured (edge, confidence) thresholds
    pub fn action(&self, edge: Decimal, confidence: Decimal) -> RecommendedAction {
        let c = &self.config;
        if confidence < c.min_confidence {
            return RecommendedAction::Pass;
        }
        if edge.abs() < c.buy_edge {
            return RecommendedAction::Hold;
        }
        let strong = edge.abs() >= c.strong_edge && confidence >= c.strong_confidence;
        match (edge > Decimal::ZERO, strong) {
            (true, true) => RecommendedAction::StrongBuy,
            (true, false) => RecommendedAction::Buy,
            (false, true) => RecommendedAction::StrongSell,
            (false, false) => RecommendedAction::Sell,
        }
    }

    pub fn is_high_edge(&self, edge: Decimal) -> bool {
        edge.abs() > self.config.high_edge_threshold
    }

    /// Score one prediction against its market quote
    pub fn score(
        &self,
        prediction: &PredictionResult,
        quote: &MarketQuote,
        now: DateTime<Utc>,
    ) -> Opportunity {
        let market_price = quote.price;
        let probability = Self::to_probability(prediction.probability);
        let confidence = Self::to_probability(prediction.confidence_score);
        let edge = probability - market_price;

        let sizing = self.kelly.size(probability, market_price);
        let action = self.action(edge, confidence);
        let expected_value = Self::expected_value(probability, market_price);

        Opportunity {
            id: Uuid::new_v4(),
            market_key: quote.key(),
            platform: quote.platform.clone(),
            market_id: quote.market_id.clone(),
            question: quote.question.clone(),
            market_url: quote.url.clone(),
            market_price,
            estimated_probability: probability,
            edge,
            expected_value,
            confidence_score: confidence,
            kelly_fraction: sizing.kelly_fraction.round_dp(PROBABILITY_DP),
            suggested_stake_fraction: sizing.stake_fraction.round_dp(PROBABILITY_DP),
            side: sizing.side,
            recommended_action: action,
            high_edge: self.is_high_edge(edge),
            reasoning: reasoning(prediction, probability, market_price, edge, action, sizing.side),
            data_sources: prediction.data_sources.clone(),
            risk_factors: risk_factors(prediction, market_price),
            status: OpportunityStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for EdgeScorer {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

fn pct(value: Decimal) -> Decimal {
    (value * Decimal::ONE_HUNDRED).round_dp(1)
}

fn reasoning(
    prediction: &PredictionResult,
    probability: Decimal,
    market_price: Decimal,
    edge: Decimal,
    action: RecommendedAction,
    side: Option<Side>,
) -> String {
    let mut text = format!(
        "Estimated {}% vs market {}% (edge {:+} pts, confidence {:.2}, {:?} data quality).",
        pct(probability),
        pct(market_price),
        pct(edge),
        prediction.confidence_score,
        prediction.data_quality,
    );

    let drivers: Vec<String> = prediction
        .factors
        .iter()
        .take(DRIVERS_IN_REASONING)
        .map(|f| format!("{} ({:+.1} pts)", f.name, f.contribution * 100.0))
        .collect();
    if !drivers.is_empty() {
        text.push_str(&format!(" Drivers: {}.", drivers.join(", ")));
    }

    if !prediction.bias_corrections.is_empty() {
        text.push_str(&format!(
            " {} bias correction(s) applied.",
            prediction.bias_corrections.len()
        ));
    }

    match (action, side) {
        (RecommendedAction::Pass, _) => text.push_str(" Recommendation: Pass (confidence too low)."),
        (RecommendedAction::Hold, _) => text.push_str(" Recommendation: Hold (edge too small)."),
        (action, Some(Side::Yes)) => text.push_str(&format!(" Recommendation: {} Yes.", action)),
        (action, Some(Side::No)) => text.push_str(&format!(" Recommendation: {} (buy No).", action)),
        (action, None) => text.push_str(&format!(" Recommendation: {}.", action)),
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::prediction;
    use rust_decimal_macros::dec;

    fn quote(price: Decimal) -> MarketQuote {
        MarketQuote::new("polymarket", "m1", "Will the test pass?", price)
    }

    #[test]
    fn test_underpriced_market_is_a_buy() {
        let scorer = EdgeScorer::default();
        let p = prediction(0.55, 0.45, 0.65, 0.7);
        let opp = scorer.score(&p, &quote(dec!(0.40)), Utc::now());

        assert_eq!(opp.edge, dec!(0.15));
        assert_eq!(opp.edge, opp.estimated_probability - opp.market_price);
        assert!(opp.high_edge);
        assert!(matches!(
            opp.recommended_action,
            RecommendedAction::Buy | RecommendedAction::StrongBuy
        ));
        assert_eq!(opp.side, Some(Side::Yes));
        // 0.15 / 0.60
        assert_eq!(opp.kelly_fraction, dec!(0.25));
        // 0.55 / 0.40 - 1
        assert_eq!(opp.expected_value, dec!(0.375));
        assert_eq!(opp.market_key, "polymarket:m1");
        assert!(opp.reasoning.contains("edge +15.0 pts"));
    }

    #[test]
    fn test_overpriced_market_is_a_sell() {
        let scorer = EdgeScorer::default();
        let p = prediction(0.30, 0.20, 0.40, 0.7);
        let opp = scorer.score(&p, &quote(dec!(0.90)), Utc::now());

        assert_eq!(opp.edge, dec!(-0.60));
        assert!(matches!(
            opp.recommended_action,
            RecommendedAction::Sell | RecommendedAction::StrongSell
        ));
        assert_eq!(opp.side, Some(Side::No));
        assert!(opp.kelly_fraction <= dec!(1));
        assert!(opp.kelly_fraction > dec!(0.66));
        // 0.70 / 0.10 - 1
        assert_eq!(opp.expected_value, dec!(6));
        assert!(opp.reasoning.contains("(buy No)"));
    }

    #[test]
    fn test_action_thresholds() {
        let scorer = EdgeScorer::default();
        assert_eq!(scorer.action(dec!(0.5), dec!(0.2)), RecommendedAction::Pass);
        assert_eq!(scorer.action(dec!(0.02), dec!(0.9)), RecommendedAction::Hold);
        assert_eq!(scorer.action(dec!(-0.02), dec!(0.9)), RecommendedAction::Hold);
        assert_eq!(scorer.action(dec!(0.05), dec!(0.9)), RecommendedAction::Buy);
        assert_eq!(scorer.action(dec!(0.12), dec!(0.5)), RecommendedAction::Buy);
        assert_eq!(scorer.action(dec!(0.12), dec!(0.6)), RecommendedAction::StrongBuy);
        assert_eq!(scorer.action(dec!(-0.05), dec!(0.9)), RecommendedAction::Sell);
        assert_eq!(scorer.action(dec!(-0.12), dec!(0.6)), RecommendedAction::StrongSell);
    }

    #[test]
    fn test_custom_thresholds() {
        let scorer = EdgeScorer::new(ScoringConfig {
            min_confidence: dec!(0.1),
            buy_edge: dec!(0.2),
            ..Default::default()
        });
        assert_eq!(scorer.action(dec!(0.15), dec!(0.2)), RecommendedAction::Hold);
        assert_eq!(scorer.action(dec!(0.25), dec!(0.2)), RecommendedAction::Buy);
    }

    #[test]
    fn test_high_edge_is_strictly_greater() {
        let scorer = EdgeScorer::default();
        assert!(!scorer.is_high_edge(dec!(0.10)));
        assert!(scorer.is_high_edge(dec!(0.1001)));
        assert!(scorer.is_high_edge(dec!(-0.2)));
    }

    #[test]
    fn test_probability_rounding_keeps_edge_exact() {
        let probability = EdgeScorer::to_probability(0.123456789);
        assert_eq!(probability, dec!(0.1235));
        let edge = probability - dec!(0.1);
        assert_eq!(edge + dec!(0.1), probability);
    }

    #[test]
    fn test_low_confidence_passes() {
        let scorer = EdgeScorer::default();
        let p = prediction(0.8, 0.55, 1.0, 0.1);
        let opp = scorer.score(&p, &quote(dec!(0.5)), Utc::now());
        assert_eq!(opp.recommended_action, RecommendedAction::Pass);
        assert!(opp.reasoning.ends_with("Recommendation: Pass (confidence too low)."));
        // Kelly is still reported for the favoured side
        assert_eq!(opp.side, Some(Side::Yes));
    }
}
