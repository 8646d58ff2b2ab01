//! Best-effort activity recording.

use std::sync::Arc;

use tracing::warn;

use crate::record::ActivityRecord;
use crate::store::ActivityStore;

/// Records audit entries after successful business writes.
///
/// The triggering operation has already committed when this runs, so a
/// failed append must not surface to the caller: the record is dropped and
/// the failure is logged. The business write and the audit append are two
/// independent operations with no cross-store transaction; a crash between
/// them leaves the audit entry missing, which is accepted.
#[derive(Clone)]
pub struct ActivityRecorder {
    store: Arc<dyn ActivityStore>,
}

impl ActivityRecorder {
    pub fn new(store: Arc<dyn ActivityStore>) -> Self {
        Self { store }
    }

    /// Append `record`, swallowing (but logging) any storage failure.
    pub async fn record(&self, record: ActivityRecord) {
        let kind = record.kind;
        if let Err(e) = self.store.append(record).await {
            warn!(error = %e, kind = kind.as_str(), "failed to append activity record");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::RwLock;

    use async_trait::async_trait;
    use pipecrm_core::StoreError;
    use pipecrm_leads::{Lead, NewLead};

    use super::*;

    #[derive(Default)]
    struct FlakyStore {
        fail: bool,
        appended: RwLock<Vec<ActivityRecord>>,
    }

    #[async_trait]
    impl ActivityStore for FlakyStore {
        async fn append(&self, record: ActivityRecord) -> Result<(), StoreError> {
            if self.fail {
                return Err(StoreError::backend("disk on fire"));
            }
            self.appended.write().unwrap().push(record);
            Ok(())
        }

        async fn recent(
            &self,
            _user_email: &str,
            _limit: usize,
        ) -> Result<Vec<ActivityRecord>, StoreError> {
            Ok(self.appended.read().unwrap().clone())
        }
    }

    fn lead() -> Lead {
        Lead::create(
            "jane@acme.io",
            NewLead {
                first_name: "Jane".into(),
                last_name: "Doe".into(),
                email: None,
                company: None,
                phone: None,
                source: None,
                status: None,
                notes: None,
            },
        )
    }

    #[tokio::test]
    async fn successful_append_is_stored() {
        let store = Arc::new(FlakyStore::default());
        let recorder = ActivityRecorder::new(store.clone());

        recorder
            .record(ActivityRecord::lead_created("jane@acme.io", &lead()))
            .await;

        assert_eq!(store.appended.read().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn append_failure_is_swallowed() {
        let store = Arc::new(FlakyStore {
            fail: true,
            ..FlakyStore::default()
        });
        let recorder = ActivityRecorder::new(store.clone());

        // Must not panic or propagate; the caller already succeeded.
        recorder
            .record(ActivityRecord::lead_created("jane@acme.io", &lead()))
            .await;

        assert!(store.appended.read().unwrap().is_empty());
    }
}
