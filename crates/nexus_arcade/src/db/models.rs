//! Database models.

use derive_getters::Getters;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::db::schema;
use crate::store::{Counter, RecordDelta};

/// A player's persisted profile and counters.
///
/// The same shape is stored as a row by [`UserRepository`](crate::UserRepository)
/// and as a JSON document by [`DocumentStore`](crate::DocumentStore). Counters
/// missing from a document read as zero. Documents written by the first web
/// clients use `best_reaction` and `total_xp`; both are accepted on read.
#[derive(
    Debug,
    Clone,
    Default,
    PartialEq,
    Serialize,
    Deserialize,
    Queryable,
    Selectable,
    Insertable,
    Getters,
)]
#[diesel(table_name = schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(default, rename_all = "camelCase")]
pub struct UserRecord {
    user_id: String,
    display_name: String,
    #[serde(rename = "photoURL")]
    photo_url: Option<String>,
    wins: i64,
    losses: i64,
    matches: i64,
    win_rate: f64,
    #[serde(alias = "best_reaction")]
    best_reaction_ms: Option<i64>,
    #[serde(alias = "total_xp")]
    total_xp: i64,
}

impl UserRecord {
    /// Creates a record with zeroed counters.
    #[instrument(skip(user_id, display_name, photo_url))]
    pub fn fresh(
        user_id: impl Into<String>,
        display_name: impl Into<String>,
        photo_url: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            photo_url,
            ..Self::default()
        }
    }

    /// Applies a delta in place and recomputes the win rate.
    #[instrument(skip(self, delta), fields(user_id = %self.user_id))]
    pub fn apply(&mut self, delta: &RecordDelta) {
        for (counter, by) in delta.increments() {
            let slot = match counter {
                Counter::Wins => &mut self.wins,
                Counter::Losses => &mut self.losses,
                Counter::Matches => &mut self.matches,
                Counter::TotalXp => &mut self.total_xp,
            };
            *slot = slot.saturating_add(*by);
        }
        if let Some(candidate) = delta.best_reaction_ms() {
            self.best_reaction_ms = Some(
                self.best_reaction_ms
                    .map_or(candidate, |best| best.min(candidate)),
            );
        }
        self.win_rate = win_rate(self.wins, self.losses);
    }

    /// Overrides the key, used when a document omits its own id.
    pub(crate) fn set_user_id(&mut self, user_id: impl Into<String>) {
        self.user_id = user_id.into();
    }
}

/// Percentage of decisive games won; zero before any decisive game.
fn win_rate(wins: i64, losses: i64) -> f64 {
    let decisive = wins + losses;
    if decisive <= 0 {
        0.0
    } else {
        wins as f64 / decisive as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_record_is_zeroed() {
        let record = UserRecord::fresh("local:ada", "Ada", None);
        assert_eq!(*record.wins(), 0);
        assert_eq!(*record.total_xp(), 0);
        assert_eq!(*record.best_reaction_ms(), None);
        assert_eq!(*record.win_rate(), 0.0);
    }

    #[test]
    fn test_apply_recomputes_win_rate() {
        let mut record = UserRecord::fresh("local:ada", "Ada", None);
        record.apply(&RecordDelta::win());
        record.apply(&RecordDelta::win());
        record.apply(&RecordDelta::win());
        record.apply(&RecordDelta::loss());
        assert_eq!(*record.wins(), 3);
        assert_eq!(*record.losses(), 1);
        assert_eq!(*record.matches(), 4);
        assert!((record.win_rate() - 75.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_best_reaction_keeps_minimum() {
        let mut record = UserRecord::fresh("local:ada", "Ada", None);
        record.apply(&RecordDelta::reaction(280, 50));
        record.apply(&RecordDelta::reaction(320, 10));
        assert_eq!(*record.best_reaction_ms(), Some(280));
        record.apply(&RecordDelta::reaction(190, 100));
        assert_eq!(*record.best_reaction_ms(), Some(190));
        assert_eq!(*record.total_xp(), 160);
    }

    #[test]
    fn test_missing_counters_default_to_zero() {
        let record: UserRecord =
            serde_json::from_str(r#"{"displayName":"Legacy","wins":4,"matches":6}"#)
                .expect("Parse failed");
        assert_eq!(*record.wins(), 4);
        assert_eq!(*record.losses(), 0);
        assert_eq!(*record.total_xp(), 0);
        assert_eq!(record.user_id(), "");
    }
}
