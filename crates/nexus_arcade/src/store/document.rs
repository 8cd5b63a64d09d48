//! In-process document store.
//!
//! Records are kept as JSON documents keyed by user id, the way a hosted
//! document database would hold them. Documents written by older clients may
//! lack counters; those read as zero.
//!
//! A delta rewrites only the keys it touches. Keys the record does not model
//! survive, and a field stored under a legacy key is updated in place.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::db::UserRecord;
use crate::store::{Counter, RecordDelta, SortDirection, StatField, StoreError, UserRecordStore};

/// Current key of a stat field, and the key older clients wrote it under.
fn document_keys(field: StatField) -> (&'static str, Option<&'static str>) {
    match field {
        StatField::Wins => ("wins", None),
        StatField::Losses => ("losses", None),
        StatField::Matches => ("matches", None),
        StatField::WinRate => ("winRate", None),
        StatField::BestReactionMs => ("bestReactionMs", Some("best_reaction")),
        StatField::TotalXp => ("totalXp", Some("total_xp")),
    }
}

/// Fields a delta changes once applied. The win rate is always recomputed.
fn touched_fields(delta: &RecordDelta) -> Vec<StatField> {
    let mut fields: Vec<StatField> = delta
        .increments()
        .iter()
        .map(|(counter, _)| match counter {
            Counter::Wins => StatField::Wins,
            Counter::Losses => StatField::Losses,
            Counter::Matches => StatField::Matches,
            Counter::TotalXp => StatField::TotalXp,
        })
        .collect();
    if delta.best_reaction_ms().is_some() {
        fields.push(StatField::BestReactionMs);
    }
    fields.push(StatField::WinRate);
    fields.dedup();
    fields
}

/// JSON document store held in memory.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Mutex<BTreeMap<String, Value>>,
}

impl DocumentStore {
    /// Creates an empty store.
    #[instrument]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes a raw document, replacing any existing one.
    #[instrument(skip(self, user_id, document))]
    pub fn insert_document(&self, user_id: impl Into<String>, document: Value) {
        let user_id = user_id.into();
        debug!(user_id = %user_id, "Document written");
        self.lock().insert(user_id, document);
    }

    /// Raw document for `user_id`.
    pub fn document(&self, user_id: &str) -> Option<Value> {
        self.lock().get(user_id).cloned()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Value>> {
        self.documents.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn decode(user_id: &str, document: &Value) -> Result<UserRecord, StoreError> {
        let mut record: UserRecord = serde_json::from_value(document.clone())?;
        record.set_user_id(user_id);
        Ok(record)
    }

    /// Writes `fields` of `record` into `document`, leaving other keys alone.
    fn merge(
        document: &mut Value,
        record: &UserRecord,
        fields: &[StatField],
    ) -> Result<(), StoreError> {
        let encoded = serde_json::to_value(record)?;
        let Value::Object(object) = document else {
            return Err(StoreError::new("Document is not an object"));
        };
        for field in fields {
            let (current, legacy) = document_keys(*field);
            let key = legacy
                .filter(|key| object.contains_key(*key))
                .unwrap_or(current);
            object.insert(key.to_string(), encoded[current].clone());
        }
        Ok(())
    }
}

#[async_trait]
impl UserRecordStore for DocumentStore {
    #[instrument(skip(self))]
    async fn get_record(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let documents = self.lock();
        documents
            .get(user_id)
            .map(|document| Self::decode(user_id, document))
            .transpose()
    }

    #[instrument(skip(self, record), fields(user_id = %record.user_id()))]
    async fn create_record(&self, record: UserRecord) -> Result<UserRecord, StoreError> {
        let mut documents = self.lock();
        if documents.contains_key(record.user_id()) {
            return Err(StoreError::new(format!(
                "Record for '{}' already exists",
                record.user_id()
            )));
        }
        documents.insert(record.user_id().clone(), serde_json::to_value(&record)?);
        info!(display_name = %record.display_name(), "Record created");
        Ok(record)
    }

    #[instrument(skip(self, delta))]
    async fn apply_delta(
        &self,
        user_id: &str,
        delta: &RecordDelta,
    ) -> Result<UserRecord, StoreError> {
        let mut documents = self.lock();
        let document = documents
            .get_mut(user_id)
            .ok_or_else(|| StoreError::new(format!("No record for user '{}'", user_id)))?;
        let mut record = Self::decode(user_id, document)?;
        record.apply(delta);
        Self::merge(document, &record, &touched_fields(delta))?;
        info!(wins = record.wins(), total_xp = record.total_xp(), "Delta applied");
        Ok(record)
    }

    #[instrument(skip(self))]
    async fn top_n(
        &self,
        field: StatField,
        direction: SortDirection,
        n: usize,
    ) -> Result<Vec<UserRecord>, StoreError> {
        let documents = self.lock();
        let mut ranked = Vec::with_capacity(documents.len());
        for (user_id, document) in documents.iter() {
            match Self::decode(user_id, document) {
                Ok(record) => {
                    if let Some(value) = field.value_of(&record) {
                        ranked.push((value, record));
                    }
                }
                Err(e) => warn!(user_id = %user_id, error = %e, "Skipping malformed document"),
            }
        }
        ranked.sort_by(|(a, ra), (b, rb)| {
            a.compare(*b, direction)
                .then_with(|| ra.display_name().cmp(rb.display_name()))
        });
        ranked.truncate(n);
        debug!(count = ranked.len(), "Top records ranked");
        Ok(ranked.into_iter().map(|(_, record)| record).collect())
    }
}
