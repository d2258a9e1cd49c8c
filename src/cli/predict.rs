//! Predict command implementation

use super::build_orchestrator;
use crate::config::Config;
use crate::market::MarketQuote;
use chrono::Utc;
use clap::Args;
use rust_decimal::Decimal;

const ADHOC_PLATFORM: &str = "adhoc";

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// The question to estimate
    pub question: String,

    /// Current market price; when given the estimate is also scored
    #[arg(long)]
    pub market_price: Option<Decimal>,
}

impl PredictArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let orchestrator = build_orchestrator(config)?;
        let now = Utc::now();

        let quote = self
            .market_price
            .map(|price| MarketQuote::new(ADHOC_PLATFORM, "cli", self.question.clone(), price));
        let prediction = orchestrator
            .predict_with(&self.question, quote.as_ref(), now)
            .await?;

        let output = match &quote {
            Some(quote) => {
                let opportunity = orchestrator.scorer().score(&prediction, quote, now);
                serde_json::json!({
                    "prediction": prediction,
                    "opportunity": opportunity,
                })
            }
            None => serde_json::to_value(&prediction)?,
        };

        println!("{}", serde_json::to_string_pretty(&output)?);
        Ok(())
    }
}
