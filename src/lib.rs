//! poly-alpha: probability estimation and edge detection for prediction markets
//!
//! This library provides the core components for:
//! - Article weighting by source credibility and recency
//! - Lexicon sentiment scoring
//! - Factor decomposition behind a pluggable strategy
//! - Bayesian probability estimation with bias correction
//! - Edge scoring, expected value, and Kelly sizing
//! - Concurrent scans with opportunity persistence
//! - Scan archiving to Parquet
//! - Full observability stack

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod factor;
pub mod market;
pub mod model;
pub mod news;
pub mod normalize;
pub mod risk;
pub mod scan;
pub mod sentiment;
pub mod signal;
pub mod storage;
pub mod telemetry;
