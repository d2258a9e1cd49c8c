//! Opportunity scoring module
//!
//! Compares estimated probabilities with market prices and recommends actions

mod scorer;
mod types;

pub use scorer::EdgeScorer;
pub use types::{Opportunity, OpportunityStatus, RecommendedAction, Side};
