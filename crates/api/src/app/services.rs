//! Service graph assembly.

use std::sync::Arc;

use sqlx::PgPool;

use pipecrm_activity::{ActivityRecorder, ActivityStore};
use pipecrm_auth::{AuthGateway, CredentialStore, TokenService};
use pipecrm_deals::DealStore;
use pipecrm_leads::LeadStore;
use pipecrm_store::{
    InMemoryActivityStore, InMemoryCredentialStore, InMemoryDealStore, InMemoryLeadStore,
    PostgresActivityStore, PostgresCredentialStore, PostgresDealStore, PostgresLeadStore,
};

use crate::ports::{CampaignDispatcher, DataSync, LogOnlyCampaigns, NoopDataSync};

/// Everything the handlers need, wired once at startup and shared through
/// an `Extension` layer.
pub struct AppServices {
    pub auth: Arc<AuthGateway>,
    pub users: Arc<dyn CredentialStore>,
    pub leads: Arc<dyn LeadStore>,
    pub deals: Arc<dyn DealStore>,
    pub activity_log: Arc<dyn ActivityStore>,
    pub recorder: ActivityRecorder,
    pub campaigns: Arc<dyn CampaignDispatcher>,
    pub sync: Arc<dyn DataSync>,
}

impl AppServices {
    /// In-memory backend: tests, local development, and the default runtime
    /// when no database is configured.
    pub fn in_memory(secret: &str) -> Self {
        Self::assemble(
            Arc::new(InMemoryCredentialStore::new()),
            Arc::new(InMemoryLeadStore::new()),
            Arc::new(InMemoryDealStore::new()),
            Arc::new(InMemoryActivityStore::new()),
            secret,
        )
    }

    /// PostgreSQL backend over one shared pool.
    pub fn postgres(pool: PgPool, secret: &str) -> Self {
        Self::assemble(
            Arc::new(PostgresCredentialStore::new(pool.clone())),
            Arc::new(PostgresLeadStore::new(pool.clone())),
            Arc::new(PostgresDealStore::new(pool.clone())),
            Arc::new(PostgresActivityStore::new(pool)),
            secret,
        )
    }

    fn assemble(
        users: Arc<dyn CredentialStore>,
        leads: Arc<dyn LeadStore>,
        deals: Arc<dyn DealStore>,
        activity_log: Arc<dyn ActivityStore>,
        secret: &str,
    ) -> Self {
        let auth = Arc::new(AuthGateway::new(users.clone(), TokenService::new(secret)));
        let recorder = ActivityRecorder::new(activity_log.clone());

        Self {
            auth,
            users,
            leads,
            deals,
            activity_log,
            recorder,
            campaigns: Arc::new(LogOnlyCampaigns),
            sync: Arc::new(NoopDataSync),
        }
    }
}
