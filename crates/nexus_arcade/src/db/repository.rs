//! SQLite repository for user records.

use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::db::{UserRecord, schema::users};
use crate::store::{RecordDelta, SortDirection, StatField, StoreError};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Applies the requested direction to a boxed query.
macro_rules! ordered {
    ($query:expr, $column:expr, $direction:expr) => {
        match $direction {
            SortDirection::Ascending => $query.order($column.asc()),
            SortDirection::Descending => $query.order($column.desc()),
        }
    };
}

/// Database repository for user records.
///
/// Opens one connection per call, so the path must name a file; an
/// in-memory database would lose its schema between calls.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db_path: String,
}

impl UserRepository {
    /// Opens the database at `db_path` and applies pending migrations.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path.as_ref()))]
    pub fn open(db_path: impl AsRef<str>) -> Result<Self, StoreError> {
        let repository = Self {
            db_path: db_path.as_ref().to_string(),
        };
        let mut conn = repository.connection()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Migrations failed: {}", e)))?;
        info!(path = %repository.db_path, applied = applied.len(), "UserRepository ready");
        Ok(repository)
    }

    /// Path of the backing database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        SqliteConnection::establish(&self.db_path)
            .map_err(|e| StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e)))
    }

    /// Gets a record by user id. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_record(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let mut conn = self.connection()?;
        let record = users::table
            .find(user_id)
            .select(UserRecord::as_select())
            .first(&mut conn)
            .optional()?;
        debug!(found = record.is_some(), "Record lookup");
        Ok(record)
    }

    /// Inserts a new record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the user id already exists or a database error occurs.
    #[instrument(skip(self, record), fields(user_id = %record.user_id()))]
    pub fn create_record(&self, record: &UserRecord) -> Result<UserRecord, StoreError> {
        let mut conn = self.connection()?;
        let created = diesel::insert_into(users::table)
            .values(record)
            .returning(UserRecord::as_returning())
            .get_result(&mut conn)?;
        info!(display_name = %created.display_name(), "Record created");
        Ok(created)
    }

    /// Applies a delta inside a transaction and returns the updated record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the record does not exist or a database error occurs.
    #[instrument(skip(self, delta))]
    pub fn apply_delta(&self, user_id: &str, delta: &RecordDelta) -> Result<UserRecord, StoreError> {
        let mut conn = self.connection()?;
        let updated = conn.transaction::<_, StoreError, _>(|conn| {
            let mut record = users::table
                .find(user_id)
                .select(UserRecord::as_select())
                .first(conn)
                .optional()?
                .ok_or_else(|| StoreError::new(format!("No record for user '{}'", user_id)))?;
            record.apply(delta);

            diesel::update(users::table.find(user_id))
                .set((
                    users::wins.eq(*record.wins()),
                    users::losses.eq(*record.losses()),
                    users::matches.eq(*record.matches()),
                    users::win_rate.eq(*record.win_rate()),
                    users::best_reaction_ms.eq(*record.best_reaction_ms()),
                    users::total_xp.eq(*record.total_xp()),
                    users::updated_at.eq(diesel::dsl::now),
                ))
                .execute(conn)?;
            Ok(record)
        })?;
        info!(
            wins = updated.wins(),
            losses = updated.losses(),
            total_xp = updated.total_xp(),
            "Delta applied"
        );
        Ok(updated)
    }

    /// Returns up to `n` records ordered by `field`.
    ///
    /// Ties are broken by display name. Records without a reaction time are
    /// excluded when ordering by [`StatField::BestReactionMs`].
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn top_n(
        &self,
        field: StatField,
        direction: SortDirection,
        n: usize,
    ) -> Result<Vec<UserRecord>, StoreError> {
        let mut conn = self.connection()?;
        let query = users::table
            .select(UserRecord::as_select())
            .into_boxed::<Sqlite>();
        let query = match field {
            StatField::Wins => ordered!(query, users::wins, direction),
            StatField::Losses => ordered!(query, users::losses, direction),
            StatField::Matches => ordered!(query, users::matches, direction),
            StatField::WinRate => ordered!(query, users::win_rate, direction),
            StatField::TotalXp => ordered!(query, users::total_xp, direction),
            StatField::BestReactionMs => ordered!(
                query.filter(users::best_reaction_ms.is_not_null()),
                users::best_reaction_ms,
                direction
            ),
        };
        let limit = i64::try_from(n).unwrap_or(i64::MAX);
        let records = query
            .then_order_by(users::display_name.asc())
            .limit(limit)
            .load(&mut conn)?;
        info!(count = records.len(), "Top records loaded");
        Ok(records)
    }
}
