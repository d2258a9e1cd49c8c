//! Risk notes for an opportunity

use crate::model::{DataQuality, PredictionResult};
use rust_decimal::Decimal;

const WIDE_INTERVAL: f64 = 0.3;

/// Risk factors surfaced with a scored opportunity
pub fn risk_factors(prediction: &PredictionResult, market_price: Decimal) -> Vec<String> {
    let mut risks = Vec::new();

    if prediction.data_quality == DataQuality::Low {
        risks.push("Low data quality".to_string());
    }

    let ci = prediction.confidence_interval;
    if ci.width() > WIDE_INTERVAL {
        risks.push(format!("Wide confidence interval [{:.2}, {:.2}]", ci.lower, ci.upper));
    }

    if let Ok(price) = f64::try_from(market_price) {
        if ci.lower <= price && price <= ci.upper {
            risks.push("Market price lies inside the 95% interval".to_string());
        }
    }

    if !prediction.bias_corrections.is_empty() {
        risks.push(format!(
            "Estimate adjusted by {} bias correction(s)",
            prediction.bias_corrections.len()
        ));
    }

    risks.extend(prediction.uncertainty_factors.iter().cloned());
    risks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::prediction;
    use rust_decimal_macros::dec;

    #[test]
    fn test_confident_estimate_far_from_market_has_no_risks() {
        let p = prediction(0.55, 0.50, 0.60, 0.8);
        assert!(risk_factors(&p, dec!(0.30)).is_empty());
    }

    #[test]
    fn test_weak_estimate_collects_risks() {
        let mut p = prediction(0.55, 0.35, 0.75, 0.2);
        p.bias_corrections.push("Overconfidence shrinkage".to_string());
        p.uncertainty_factors.push("Thin coverage: only 1 article(s)".to_string());

        let risks = risk_factors(&p, dec!(0.50));
        assert_eq!(
            risks,
            vec![
                "Low data quality".to_string(),
                "Wide confidence interval [0.35, 0.75]".to_string(),
                "Market price lies inside the 95% interval".to_string(),
                "Estimate adjusted by 1 bias correction(s)".to_string(),
                "Thin coverage: only 1 article(s)".to_string(),
            ]
        );
    }
}
