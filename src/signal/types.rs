//! Opportunity types

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Outcome side of a binary market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy Yes shares
    Yes,
    /// Buy No shares
    No,
}

/// Recommended action for an opportunity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendedAction {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    Buy,
    Hold,
    Sell,
    #[serde(rename = "Strong Sell")]
    StrongSell,
    Pass,
}

impl fmt::Display for RecommendedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            RecommendedAction::StrongBuy => "Strong Buy",
            RecommendedAction::Buy => "Buy",
            RecommendedAction::Hold => "Hold",
            RecommendedAction::Sell => "Sell",
            RecommendedAction::StrongSell => "Strong Sell",
            RecommendedAction::Pass => "Pass",
        };
        f.write_str(action)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpportunityStatus {
    Active,
    Closed,
}

/// A scored market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub id: Uuid,
    /// Market identity, "platform:market_id"
    pub market_key: String,
    pub platform: String,
    pub market_id: String,
    pub question: String,
    pub market_url: Option<String>,
    /// Price snapshot at scan time
    pub market_price: Decimal,
    pub estimated_probability: Decimal,
    /// estimated_probability - market_price
    pub edge: Decimal,
    /// Expected profit per $1 staked on the recommended side
    pub expected_value: Decimal,
    pub confidence_score: Decimal,
    /// Full Kelly fraction, [0, 1]
    pub kelly_fraction: Decimal,
    /// Fractional Kelly stake, capped
    pub suggested_stake_fraction: Decimal,
    pub side: Option<Side>,
    pub recommended_action: RecommendedAction,
    pub high_edge: bool,
    pub reasoning: String,
    pub data_sources: Vec<String>,
    pub risk_factors: Vec<String>,
    pub status: OpportunityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    pub fn is_active(&self) -> bool {
        self.status == OpportunityStatus::Active
    }

    /// Take the scored fields of a newer scan, keeping identity and creation time
    pub fn refresh_from(&mut self, newer: &Opportunity) {
        let (id, created_at) = (self.id, self.created_at);
        *self = Opportunity {
            id,
            created_at,
            status: OpportunityStatus::Active,
            ..newer.clone()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_display_matches_serde() {
        for action in [
            RecommendedAction::StrongBuy,
            RecommendedAction::Buy,
            RecommendedAction::Hold,
            RecommendedAction::Sell,
            RecommendedAction::StrongSell,
            RecommendedAction::Pass,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action));
        }
    }

    #[test]
    fn test_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Side::Yes).unwrap(), "\"yes\"");
    }
}
