//! Kelly criterion sizing for binary markets

use crate::signal::Side;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Kelly output for one market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KellySizing {
    /// Side the edge favours; None when there is no edge
    pub side: Option<Side>,
    /// Full Kelly fraction, clamped to [0, 1]
    pub kelly_fraction: Decimal,
    /// Fractional Kelly stake, capped by the position limit
    pub stake_fraction: Decimal,
}

/// Kelly criterion calculator for binary outcomes
#[derive(Debug, Clone)]
pub struct KellyCalculator {
    /// Kelly multiplier (e.g., 0.25 for quarter Kelly)
    pub multiplier: Decimal,
    /// Maximum stake as a fraction of bankroll
    pub max_position_pct: Decimal,
}

impl KellyCalculator {
    pub fn new(multiplier: Decimal, max_position_pct: Decimal) -> Self {
        Self {
            multiplier,
            max_position_pct,
        }
    }

    /// Full Kelly fraction on whichever side the edge favours
    ///
    /// Shares pay $1 if correct, $0 if wrong:
    /// - Yes at price m: f* = (p - m) / (1 - m)
    /// - No at price 1 - m: f* = (m - p) / m
    pub fn fraction(probability: Decimal, market_price: Decimal) -> (Option<Side>, Decimal) {
        if market_price <= Decimal::ZERO || market_price >= Decimal::ONE {
            return (None, Decimal::ZERO);
        }

        let edge = probability - market_price;
        let (side, raw) = if edge > Decimal::ZERO {
            (Some(Side::Yes), edge / (Decimal::ONE - market_price))
        } else if edge < Decimal::ZERO {
            (Some(Side::No), -edge / market_price)
        } else {
            (None, Decimal::ZERO)
        };

        (side, raw.clamp(Decimal::ZERO, Decimal::ONE))
    }

    pub fn size(&self, probability: Decimal, market_price: Decimal) -> KellySizing {
        let (side, kelly_fraction) = Self::fraction(probability, market_price);
        let stake_fraction = (kelly_fraction * self.multiplier)
            .min(self.max_position_pct)
            .max(dec!(0));
        KellySizing {
            side,
            kelly_fraction,
            stake_fraction,
        }
    }

    /// Dollar stake for a bankroll
    pub fn position_size(&self, probability: Decimal, market_price: Decimal, bankroll: Decimal) -> Decimal {
        (self.size(probability, market_price).stake_fraction * bankroll).max(dec!(0))
    }
}

impl Default for KellyCalculator {
    fn default() -> Self {
        Self::new(dec!(0.25), dec!(0.05))
    }
}
