//! Nexus Arcade hub.
//!
//! Ties the game engines to players: identities, persisted records, score
//! reporting, leaderboards and the Tokio drivers that run timed sessions.
//!
//! # Architecture
//!
//! - **Engines**: `nexus_tictactoe`, `nexus_memory` and `nexus_reaction`
//!   hold pure game state and never sleep.
//! - **Sessions**: [`MemorySession`] and [`ReactionSession`] own an engine
//!   and schedule its timed resumptions.
//! - **Scores**: [`ScoreAdapter`] mirrors results locally and writes them to
//!   a [`UserRecordStore`] in the background.
//! - **Stores**: [`UserRepository`] (SQLite) and [`DocumentStore`] (in-process
//!   JSON documents).

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod db;
mod identity;
mod leaderboard;
mod scores;
mod session;
mod store;

pub use config::{ArcadeConfig, ConfigError, DATABASE_ENV};
pub use db::{MIGRATIONS, UserRecord, UserRepository};
pub use identity::{AuthError, Identity, IdentityProvider, LocalProfile};
pub use leaderboard::{DEFAULT_LEADERBOARD_SIZE, Leaderboard, LeaderboardEntry, LeaderboardSnapshot};
pub use scores::ScoreAdapter;
pub use session::{LightsView, MemorySession, ReactionSession};
pub use store::{
    Counter, DocumentStore, RecordDelta, SortDirection, StatField, StatValue, StoreError,
    UserRecordStore,
};
