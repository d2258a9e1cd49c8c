//! Risk module
//!
//! Position sizing and risk notes attached to opportunities

mod kelly;
mod notes;

pub use kelly::{KellyCalculator, KellySizing};
pub use notes::risk_factors;
