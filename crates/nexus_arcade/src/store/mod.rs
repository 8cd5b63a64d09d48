//! User record stores.
//!
//! [`UserRecordStore`] is the seam between score reporting and persistence.
//! Two backends ship: [`UserRepository`](crate::UserRepository) on SQLite and
//! the in-process [`DocumentStore`].

mod document;
mod error;
mod sqlite;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::db::UserRecord;

pub use document::DocumentStore;
pub use error::StoreError;

/// Counters a [`RecordDelta`] can increment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display, strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Counter {
    /// Decisive games won.
    Wins,
    /// Decisive games lost.
    Losses,
    /// Games reported.
    Matches,
    /// Experience from reaction runs.
    TotalXp,
}

/// A change to apply to a stored record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordDelta {
    increments: Vec<(Counter, i64)>,
    best_reaction_ms: Option<i64>,
}

impl RecordDelta {
    /// An empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// A won game.
    pub fn win() -> Self {
        Self::new().increment(Counter::Wins, 1).increment(Counter::Matches, 1)
    }

    /// A lost game.
    pub fn loss() -> Self {
        Self::new().increment(Counter::Losses, 1).increment(Counter::Matches, 1)
    }

    /// A reaction run worth `xp`.
    pub fn reaction(elapsed_ms: u64, xp: u32) -> Self {
        Self::new()
            .increment(Counter::TotalXp, i64::from(xp))
            .keep_best_reaction(i64::try_from(elapsed_ms).unwrap_or(i64::MAX))
    }

    /// Adds `by` to `counter`.
    pub fn increment(mut self, counter: Counter, by: i64) -> Self {
        self.increments.push((counter, by));
        self
    }

    /// Stores `ms` as the best reaction unless a faster one is already stored.
    pub fn keep_best_reaction(mut self, ms: i64) -> Self {
        self.best_reaction_ms = Some(self.best_reaction_ms.map_or(ms, |best| best.min(ms)));
        self
    }

    /// Counter increments in insertion order.
    pub fn increments(&self) -> &[(Counter, i64)] {
        &self.increments
    }

    /// Candidate best reaction time.
    pub fn best_reaction_ms(&self) -> Option<i64> {
        self.best_reaction_ms
    }

    /// Whether applying this delta would change nothing.
    pub fn is_empty(&self) -> bool {
        self.increments.is_empty() && self.best_reaction_ms.is_none()
    }
}

/// Record fields a leaderboard can rank by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatField {
    /// Decisive games won.
    Wins,
    /// Decisive games lost.
    Losses,
    /// Games reported.
    Matches,
    /// Percentage of decisive games won.
    WinRate,
    /// Fastest reaction, in milliseconds.
    #[strum(to_string = "best_reaction_ms", serialize = "reaction")]
    BestReactionMs,
    /// Experience from reaction runs.
    #[strum(to_string = "total_xp", serialize = "xp")]
    TotalXp,
}

impl StatField {
    /// Direction in which a higher rank is better.
    pub fn natural_direction(self) -> SortDirection {
        match self {
            StatField::BestReactionMs => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }

    /// Reads this field from a record. `None` when the record has no value.
    pub fn value_of(self, record: &UserRecord) -> Option<StatValue> {
        match self {
            StatField::Wins => Some(StatValue::Count(*record.wins())),
            StatField::Losses => Some(StatValue::Count(*record.losses())),
            StatField::Matches => Some(StatValue::Count(*record.matches())),
            StatField::WinRate => Some(StatValue::Percent(*record.win_rate())),
            StatField::TotalXp => Some(StatValue::Count(*record.total_xp())),
            StatField::BestReactionMs => (*record.best_reaction_ms()).map(StatValue::Millis),
        }
    }
}

/// Sort order for [`UserRecordStore::top_n`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    Descending,
}

/// A ranked field value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, derive_more::Display)]
pub enum StatValue {
    /// Plain counter.
    #[display("{}", _0)]
    Count(i64),
    /// Percentage, 0 to 100.
    #[display("{:.1}%", _0)]
    Percent(f64),
    /// Duration in milliseconds.
    #[display("{} ms", _0)]
    Millis(i64),
}

impl StatValue {
    fn as_f64(self) -> f64 {
        match self {
            StatValue::Count(n) | StatValue::Millis(n) => n as f64,
            StatValue::Percent(p) => p,
        }
    }

    /// Orders two values of the same field in `direction`.
    pub fn compare(self, other: Self, direction: SortDirection) -> Ordering {
        let ordering = self.as_f64().total_cmp(&other.as_f64());
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Persistence for user records.
#[async_trait]
pub trait UserRecordStore: Send + Sync + std::fmt::Debug {
    /// Fetches a record. `Ok(None)` when the user has none.
    async fn get_record(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Creates a record; fails if one already exists.
    async fn create_record(&self, record: UserRecord) -> Result<UserRecord, StoreError>;

    /// Applies a delta to an existing record and returns the result.
    async fn apply_delta(&self, user_id: &str, delta: &RecordDelta)
    -> Result<UserRecord, StoreError>;

    /// Up to `n` records ranked by `field`, ties broken by display name.
    ///
    /// Records with no value for `field` are excluded.
    async fn top_n(
        &self,
        field: StatField,
        direction: SortDirection,
        n: usize,
    ) -> Result<Vec<UserRecord>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_natural_directions() {
        assert_eq!(StatField::Wins.natural_direction(), SortDirection::Descending);
        assert_eq!(StatField::WinRate.natural_direction(), SortDirection::Descending);
        assert_eq!(StatField::TotalXp.natural_direction(), SortDirection::Descending);
        assert_eq!(
            StatField::BestReactionMs.natural_direction(),
            SortDirection::Ascending
        );
    }

    #[test]
    fn test_field_names_parse() {
        assert_eq!(StatField::from_str("win_rate"), Ok(StatField::WinRate));
        assert_eq!(StatField::from_str("reaction"), Ok(StatField::BestReactionMs));
        assert_eq!(StatField::from_str("xp"), Ok(StatField::TotalXp));
        assert!(StatField::from_str("elo").is_err());
        assert_eq!(StatField::BestReactionMs.to_string(), "best_reaction_ms");
    }

    #[test]
    fn test_keep_best_within_one_delta() {
        let delta = RecordDelta::new().keep_best_reaction(300).keep_best_reaction(250);
        assert_eq!(delta.best_reaction_ms(), Some(250));
        assert!(!delta.is_empty());
        assert!(RecordDelta::new().is_empty());
    }

    #[test]
    fn test_stat_value_display() {
        assert_eq!(StatValue::Count(7).to_string(), "7");
        assert_eq!(StatValue::Percent(66.666).to_string(), "66.7%");
        assert_eq!(StatValue::Millis(212).to_string(), "212 ms");
    }
}
