//! Opportunity persistence module
//!
//! Update-or-create of opportunity records keyed by market identity

mod memory;

pub use memory::InMemoryStore;

use crate::signal::Opportunity;
use async_trait::async_trait;
use thiserror::Error;

/// Persistence errors
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Opportunity not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Result of an upsert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Trait for opportunity stores
///
/// `upsert` must be atomic per market key: an Active record for the key is
/// refreshed in place, otherwise a new record is created. Closed records are
/// never mutated.
#[async_trait]
pub trait OpportunityStore: Send + Sync {
    async fn upsert(&self, opportunity: Opportunity) -> Result<(UpsertOutcome, Opportunity), StoreError>;

    /// Refresh the Active record for the opportunity's market; never creates
    async fn refresh(&self, opportunity: Opportunity) -> Result<Option<Opportunity>, StoreError>;

    /// The Active opportunity for a market, if any
    async fn active_for(&self, market_key: &str) -> Result<Option<Opportunity>, StoreError>;

    async fn list_active(&self) -> Result<Vec<Opportunity>, StoreError>;

    /// Close the Active opportunity for a market
    async fn close(&self, market_key: &str) -> Result<Opportunity, StoreError>;
}
