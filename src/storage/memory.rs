//! In-process opportunity store

use super::{OpportunityStore, StoreError, UpsertOutcome};
use crate::signal::{Opportunity, OpportunityStatus};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Default)]
struct Records {
    /// All records ever written, in creation order
    all: Vec<Opportunity>,
    /// market key -> index of its Active record in `all`
    active: HashMap<String, usize>,
}

/// Opportunity store backed by process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<Records>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record, closed ones included
    pub async fn all(&self) -> Vec<Opportunity> {
        self.records.read().await.all.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.all.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OpportunityStore for InMemoryStore {
    async fn upsert(&self, opportunity: Opportunity) -> Result<(UpsertOutcome, Opportunity), StoreError> {
        let mut records = self.records.write().await;

        if let Some(&index) = records.active.get(&opportunity.market_key) {
            let existing = &mut records.all[index];
            existing.refresh_from(&opportunity);
            debug!(market = %existing.market_key, id = %existing.id, "Refreshed opportunity");
            return Ok((UpsertOutcome::Updated, existing.clone()));
        }

        let mut created = opportunity;
        created.status = OpportunityStatus::Active;
        let index = records.all.len();
        records.active.insert(created.market_key.clone(), index);
        records.all.push(created.clone());
        debug!(market = %created.market_key, id = %created.id, "Created opportunity");
        Ok((UpsertOutcome::Created, created))
    }

    async fn refresh(&self, opportunity: Opportunity) -> Result<Option<Opportunity>, StoreError> {
        let mut records = self.records.write().await;
        let Some(&index) = records.active.get(&opportunity.market_key) else {
            return Ok(None);
        };
        let existing = &mut records.all[index];
        existing.refresh_from(&opportunity);
        Ok(Some(existing.clone()))
    }

    async fn active_for(&self, market_key: &str) -> Result<Option<Opportunity>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .active
            .get(market_key)
            .map(|&index| records.all[index].clone()))
    }

    async fn list_active(&self) -> Result<Vec<Opportunity>, StoreError> {
        let records = self.records.read().await;
        let mut indices: Vec<usize> = records.active.values().copied().collect();
        indices.sort_unstable();
        Ok(indices.into_iter().map(|i| records.all[i].clone()).collect())
    }

    async fn close(&self, market_key: &str) -> Result<Opportunity, StoreError> {
        let mut records = self.records.write().await;
        let index = records
            .active
            .remove(market_key)
            .ok_or_else(|| StoreError::NotFound(market_key.to_string()))?;
        let record = &mut records.all[index];
        record.status = OpportunityStatus::Closed;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}
