//! [`UserRecordStore`] over the SQLite repository.
//!
//! Diesel calls block, so each one runs on the blocking pool.

use async_trait::async_trait;
use tracing::instrument;

use crate::UserRepository;
use crate::db::UserRecord;
use crate::store::{RecordDelta, SortDirection, StatField, StoreError, UserRecordStore};

#[async_trait]
impl UserRecordStore for UserRepository {
    #[instrument(skip(self))]
    async fn get_record(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let repository = self.clone();
        let user_id = user_id.to_string();
        let record = tokio::task::spawn_blocking(move || repository.get_record(&user_id)).await??;
        Ok(record)
    }

    #[instrument(skip(self, record), fields(user_id = %record.user_id()))]
    async fn create_record(&self, record: UserRecord) -> Result<UserRecord, StoreError> {
        let repository = self.clone();
        let created =
            tokio::task::spawn_blocking(move || repository.create_record(&record)).await??;
        Ok(created)
    }

    #[instrument(skip(self, delta))]
    async fn apply_delta(
        &self,
        user_id: &str,
        delta: &RecordDelta,
    ) -> Result<UserRecord, StoreError> {
        let repository = self.clone();
        let user_id = user_id.to_string();
        let delta = delta.clone();
        let updated =
            tokio::task::spawn_blocking(move || repository.apply_delta(&user_id, &delta)).await??;
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn top_n(
        &self,
        field: StatField,
        direction: SortDirection,
        n: usize,
    ) -> Result<Vec<UserRecord>, StoreError> {
        let repository = self.clone();
        let records =
            tokio::task::spawn_blocking(move || repository.top_n(field, direction, n)).await??;
        Ok(records)
    }
}
