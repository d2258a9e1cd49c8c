//! Best/base/worst scenario generation

use super::{Scenario, ScenarioSet};
use crate::factor::Factor;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioGenerator;

impl ScenarioGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Posterior +/- half-width, clamped to [0,1], with factor-driven narratives
    pub fn generate(&self, probability: f64, half_width: f64, factors: &[Factor]) -> ScenarioSet {
        let p = probability.clamp(0.0, 1.0);
        let hw = if half_width.is_finite() { half_width.abs() } else { 0.0 };

        let upside = dominant(factors, |c| c > 0.0);
        let downside = dominant(factors, |c| c < 0.0);

        let best = match upside {
            Some(f) => format!("{} strengthens: {}", f.name, f.description),
            None => "Coverage turns favourable beyond what current evidence shows".to_string(),
        };
        let worst = match downside {
            Some(f) => format!("{} dominates: {}", f.name, f.description),
            None => "Unreported developments work against resolution".to_string(),
        };
        let base = match (upside, downside) {
            (Some(up), Some(down)) => {
                format!("{} and {} roughly offset as currently weighted", up.name, down.name)
            }
            (Some(up), None) => format!("Current evidence holds, led by {}", up.name),
            (None, Some(down)) => format!("Current evidence holds, led by {}", down.name),
            (None, None) => "No dominant factors; estimate follows the base rate".to_string(),
        };

        ScenarioSet {
            best_case: Scenario {
                probability: (p + hw).min(1.0),
                description: best,
            },
            base_case: Scenario {
                probability: p,
                description: base,
            },
            worst_case: Scenario {
                probability: (p - hw).max(0.0),
                description: worst,
            },
        }
    }
}

fn dominant(factors: &[Factor], side: impl Fn(f64) -> bool) -> Option<&Factor> {
    factors
        .iter()
        .filter(|f| side(f.contribution))
        .max_by(|a, b| {
            a.contribution
                .abs()
                .partial_cmp(&b.contribution.abs())
                .unwrap_or(Ordering::Equal)
                // alphabetically first name wins ties
                .then_with(|| b.name.cmp(&a.name))
        })
}
