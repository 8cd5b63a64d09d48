//! Ranked views over user records.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::store::{StatField, StatValue, StoreError, UserRecordStore};

/// Number of entries fetched when no size is configured.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 10;

/// One ranked row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct LeaderboardEntry {
    rank: usize,
    user_id: String,
    display_name: String,
    value: StatValue,
}

/// A leaderboard as it stood at `taken_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Getters)]
pub struct LeaderboardSnapshot {
    field: StatField,
    taken_at: DateTime<Utc>,
    entries: Vec<LeaderboardEntry>,
}

impl LeaderboardSnapshot {
    /// Whether nobody qualified.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `user_id`, if ranked.
    pub fn position_of(&self, user_id: &str) -> Option<&LeaderboardEntry> {
        self.entries.iter().find(|e| e.user_id == user_id)
    }
}

/// Fetches top-N snapshots from a store.
#[derive(Debug, Clone)]
pub struct Leaderboard {
    store: Arc<dyn UserRecordStore>,
    size: usize,
}

impl Leaderboard {
    /// Creates a view returning `size` entries per fetch.
    #[instrument(skip(store))]
    pub fn new(store: Arc<dyn UserRecordStore>, size: usize) -> Self {
        Self { store, size }
    }

    /// Top entries by `field` at the configured size.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store query fails.
    pub async fn fetch(&self, field: StatField) -> Result<LeaderboardSnapshot, StoreError> {
        self.fetch_top(field, self.size).await
    }

    /// Top `n` entries by `field` in the field's natural direction.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store query fails.
    #[instrument(skip(self))]
    pub async fn fetch_top(
        &self,
        field: StatField,
        n: usize,
    ) -> Result<LeaderboardSnapshot, StoreError> {
        let records = self.store.top_n(field, field.natural_direction(), n).await?;
        let entries: Vec<_> = records
            .into_iter()
            .filter_map(|record| field.value_of(&record).map(|value| (record, value)))
            .enumerate()
            .map(|(i, (record, value))| LeaderboardEntry {
                rank: i + 1,
                user_id: record.user_id().clone(),
                display_name: record.display_name().clone(),
                value,
            })
            .collect();
        info!(field = %field, count = entries.len(), "Leaderboard fetched");
        Ok(LeaderboardSnapshot {
            field,
            taken_at: Utc::now(),
            entries,
        })
    }
}
