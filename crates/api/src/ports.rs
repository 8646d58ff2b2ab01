//! Outbound ports for concerns served by external systems.
//!
//! Campaign delivery and external lead ingestion live outside this service.
//! The dashboard endpoints talk to these traits; the default implementations
//! acknowledge without doing the external work.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use pipecrm_auth::Identity;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CampaignRequest {
    pub subject: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignReceipt {
    pub message: String,
    pub subject: String,
}

/// Hands a campaign off to whatever delivers it.
#[async_trait]
pub trait CampaignDispatcher: Send + Sync {
    async fn dispatch(
        &self,
        request: &CampaignRequest,
        sender: &Identity,
    ) -> anyhow::Result<CampaignReceipt>;
}

/// Default dispatcher: logs the campaign and acknowledges.
pub struct LogOnlyCampaigns;

#[async_trait]
impl CampaignDispatcher for LogOnlyCampaigns {
    async fn dispatch(
        &self,
        request: &CampaignRequest,
        sender: &Identity,
    ) -> anyhow::Result<CampaignReceipt> {
        info!(
            subject = %request.subject,
            sender = %sender.email,
            "campaign accepted for dispatch"
        );
        Ok(CampaignReceipt {
            message: "Campaign queued for delivery".into(),
            subject: request.subject.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub message: String,
    pub synced: usize,
}

/// Pulls leads from an external source into the store.
#[async_trait]
pub trait DataSync: Send + Sync {
    async fn run(&self) -> anyhow::Result<SyncReport>;
}

/// Default sync: nothing to pull from, acknowledges with a zero count.
pub struct NoopDataSync;

#[async_trait]
impl DataSync for NoopDataSync {
    async fn run(&self) -> anyhow::Result<SyncReport> {
        info!("data sync requested; no external source configured");
        Ok(SyncReport {
            message: "Data sync completed".into(),
            synced: 0,
        })
    }
}
