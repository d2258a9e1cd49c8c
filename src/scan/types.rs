//! Scan report types

use crate::signal::Opportunity;
use serde::{Deserialize, Serialize};

/// One failed source or rejected market
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlatformError {
    pub platform: String,
    pub error: String,
}

impl PlatformError {
    pub fn new(platform: impl Into<String>, error: impl ToString) -> Self {
        Self {
            platform: platform.into(),
            error: error.to_string(),
        }
    }
}

/// Scan-level summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Markets that ran through the pipeline
    pub markets_scanned: usize,
    pub opportunities_created: usize,
    pub opportunities_updated: usize,
    /// Platforms involved in the scan, sorted
    pub platforms: Vec<String>,
    pub errors: Vec<PlatformError>,
    /// True when the scan deadline cut work short
    pub partial: bool,
    /// Markets not started before the deadline
    pub markets_skipped: usize,
    /// Opportunities created or refreshed by this scan
    pub opportunities: Vec<Opportunity>,
    pub elapsed_ms: u64,
}

impl ScanReport {
    /// Largest absolute edge among touched opportunities
    pub fn max_edge(&self) -> Option<rust_decimal::Decimal> {
        self.opportunities.iter().map(|o| o.edge.abs()).max()
    }
}
