//! Lead persistence contract.
//!
//! Every operation is scoped to an owner; a lead owned by someone else is
//! indistinguishable from a missing one.

use async_trait::async_trait;

use pipecrm_core::{LeadId, StoreError};

use crate::lead::{Lead, LeadPatch};
use crate::query::LeadQuery;

#[async_trait]
pub trait LeadStore: Send + Sync {
    async fn insert(&self, lead: Lead) -> Result<Lead, StoreError>;

    /// Bulk insert (CSV import). Returns the number of stored rows.
    async fn insert_many(&self, leads: Vec<Lead>) -> Result<usize, StoreError>;

    /// Filtered listing for one owner, newest first.
    async fn list(&self, owner_email: &str, query: &LeadQuery) -> Result<Vec<Lead>, StoreError>;

    /// Everything the owner has, newest first (CSV export, dashboard).
    async fn list_all(&self, owner_email: &str) -> Result<Vec<Lead>, StoreError>;

    /// Partial update; `StoreError::NotFound` when the lead is absent or
    /// not owned by `owner_email`.
    async fn update(
        &self,
        id: LeadId,
        owner_email: &str,
        patch: &LeadPatch,
    ) -> Result<Lead, StoreError>;

    /// Global lead count (conversion-rate report).
    async fn count_all(&self) -> Result<usize, StoreError>;
}
