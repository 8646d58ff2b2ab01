//! Activity persistence contract.

use async_trait::async_trait;

use pipecrm_core::StoreError;

use crate::record::ActivityRecord;

/// Append-only storage for activity records.
#[async_trait]
pub trait ActivityStore: Send + Sync {
    async fn append(&self, record: ActivityRecord) -> Result<(), StoreError>;

    /// The user's most recent records, newest first, at most `limit`.
    async fn recent(&self, user_email: &str, limit: usize)
        -> Result<Vec<ActivityRecord>, StoreError>;
}
