//! Scan orchestration module
//!
//! Fans out data fetches, runs the analysis pipeline per market, and persists
//! scored opportunities

mod cache;
mod orchestrator;
mod pipeline;
mod types;

pub use cache::ArticleCache;
pub use orchestrator::ScanOrchestrator;
pub use pipeline::AnalysisPipeline;
pub use types::{PlatformError, ScanReport};
