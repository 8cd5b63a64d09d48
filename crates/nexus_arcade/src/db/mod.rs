//! SQLite persistence for user records.

mod models;
mod repository;
mod schema;

pub use models::UserRecord;
pub use repository::{MIGRATIONS, UserRepository};
