//! `pipecrm-store` — repository implementations.
//!
//! Two backends per contract: RwLock-guarded in-memory stores (tests, dev,
//! default runtime when no database is configured) and PostgreSQL stores
//! over a shared `PgPool`. The traits themselves live next to their domain
//! models; this crate only implements them.

pub mod memory;
pub mod postgres;

pub use memory::{
    InMemoryActivityStore, InMemoryCredentialStore, InMemoryDealStore, InMemoryLeadStore,
};
pub use postgres::{
    PostgresActivityStore, PostgresCredentialStore, PostgresDealStore, PostgresLeadStore,
};
