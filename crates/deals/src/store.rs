//! Deal persistence contract.
//!
//! Ownership is enforced uniformly: reads, updates and deletes all take the
//! owner id, and a deal owned by someone else behaves as absent. (The system
//! this replaces skipped the check on read/delete; that looked unintentional
//! and is deliberately not reproduced.)

use async_trait::async_trait;

use pipecrm_core::{DealId, StoreError, UserId};

use crate::deal::{Deal, DealPatch};

#[async_trait]
pub trait DealStore: Send + Sync {
    async fn insert(&self, deal: Deal) -> Result<Deal, StoreError>;

    async fn get(&self, id: DealId, owner: UserId) -> Result<Option<Deal>, StoreError>;

    /// The owner's deals, newest first.
    async fn list(&self, owner: UserId) -> Result<Vec<Deal>, StoreError>;

    /// Every deal in the system, newest first (reports are global).
    async fn list_all(&self) -> Result<Vec<Deal>, StoreError>;

    /// Partial update; `StoreError::NotFound` when absent or not owned.
    async fn update(
        &self,
        id: DealId,
        owner: UserId,
        patch: &DealPatch,
    ) -> Result<Deal, StoreError>;

    /// Delete; `StoreError::NotFound` when absent or not owned.
    async fn delete(&self, id: DealId, owner: UserId) -> Result<(), StoreError>;
}
