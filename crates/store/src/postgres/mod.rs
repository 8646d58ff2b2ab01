//! PostgreSQL repositories over a shared [`sqlx::PgPool`].
//!
//! Queries are runtime-bound (no compile-time database required); the
//! schema lives in `migrations/0001_init.sql`. Every query scopes by owner
//! in the WHERE clause, so cross-owner access never reaches row mapping.

mod activities;
mod deals;
mod leads;
mod users;

pub use activities::PostgresActivityStore;
pub use deals::PostgresDealStore;
pub use leads::PostgresLeadStore;
pub use users::PostgresCredentialStore;

use pipecrm_core::StoreError;

/// Translate driver failures into the store taxonomy.
///
/// Backend messages stay server-side; unique violations become
/// [`StoreError::Duplicate`] so callers can map them to a conflict.
pub(crate) fn map_sqlx(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Duplicate(db.message().to_string())
        }
        sqlx::Error::RowNotFound => StoreError::NotFound,
        _ => StoreError::backend(e.to_string()),
    }
}
