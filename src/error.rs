//! Engine error taxonomy
//!
//! None of these is fatal to a scan. Each variant maps to a degradation the
//! orchestrator applies to the single market or source involved.

use std::time::Duration;
use thiserror::Error;

/// Errors raised by pipeline stages and data collaborators
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EngineError {
    /// One data source is down; continue with the remaining sources
    #[error("Source unavailable: {source_name}: {reason}")]
    SourceUnavailable { source_name: String, reason: String },
    /// No usable evidence at all; fall back to a base-rate-only estimate
    #[error("Insufficient data for question: {question}")]
    InsufficientData { question: String },
    /// Malformed question or market; reject that item only
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A fetch or the scan itself ran past its deadline
    #[error("Timed out: {operation}")]
    Timeout { operation: String, after: Duration },
}

impl EngineError {
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after,
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
