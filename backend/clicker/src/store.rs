//! # Storage Contract
//!
//! One record per user, keyed by the opaque user id.
//!
//! ## Requirements
//!
//! - Lookups never create records
//! - A click is one all-or-nothing update, created on first write
//! - `totalScore` and `totalClicks` are increments, never read-then-written
//! - `activeEffects` is replaced wholesale, last write wins between racing clicks
use std::{collections::HashMap, error::Error};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::model::{ClickDelta, Totals, UserRecord};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage backend error: {0}")]
    Backend(#[from] Box<dyn Error + Send + Sync>),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupted record: {0}")]
    Corrupted(String),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn load(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Applies one click to the record, creating it if absent.
    async fn apply_click(&self, user_id: &str, delta: &ClickDelta) -> Result<Totals, StoreError>;
}

/// Process-local store for tests and single-node runs without Redis.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn load(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.records.read().await.get(user_id).cloned())
    }

    async fn apply_click(&self, user_id: &str, delta: &ClickDelta) -> Result<Totals, StoreError> {
        let mut records = self.records.write().await;
        let record = records
            .entry(user_id.to_string())
            .or_insert_with(|| UserRecord::new(user_id));

        record.total_score += delta.score;
        record.total_clicks += 1;
        record.active_effects = delta.active_effects.clone();

        if let Some(prize) = &delta.prize {
            record.prizes.push(prize.clone());
        }

        Ok(Totals {
            total_score: record.total_score,
            total_clicks: record.total_clicks,
            active_effects: record.active_effects.clone(),
        })
    }
}
