//! `/dashboard` handlers: caller-scoped aggregates and the outbound ports.

use std::sync::Arc;

use axum::{Extension, Json};

use pipecrm_activity::ActivityRecord;
use pipecrm_auth::Identity;
use pipecrm_reports::{DashboardStats, ReportSummary};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::ports::{CampaignReceipt, CampaignRequest, SyncReport};

const RECENT_ACTIVITY_LIMIT: usize = 5;

pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<DashboardStats>, ApiError> {
    let owner = services.auth.user_id(&identity).await?;
    let leads = services.leads.list_all(&identity.email).await?;
    let deals = services.deals.list(owner).await?;

    Ok(Json(pipecrm_reports::dashboard_stats(&leads, &deals)))
}

pub async fn activities(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<ActivityRecord>>, ApiError> {
    let records = services
        .activity_log
        .recent(&identity.email, RECENT_ACTIVITY_LIMIT)
        .await?;
    Ok(Json(records))
}

/// One snapshot of the caller's funnel, shaped for rendering elsewhere.
pub async fn generate_report(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<ReportSummary>, ApiError> {
    let owner = services.auth.user_id(&identity).await?;
    let leads = services.leads.list_all(&identity.email).await?;
    let deals = services.deals.list(owner).await?;

    Ok(Json(pipecrm_reports::summary(leads.len(), &deals)))
}

pub async fn send_campaign(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(request): Json<CampaignRequest>,
) -> Result<Json<CampaignReceipt>, ApiError> {
    if !identity.role.can_send_campaigns() {
        return Err(ApiError::Forbidden);
    }

    let receipt = services
        .campaigns
        .dispatch(&request, &identity)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(receipt))
}

pub async fn sync_data(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(_identity): Extension<Identity>,
) -> Result<Json<SyncReport>, ApiError> {
    let report = services
        .sync
        .run()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok(Json(report))
}
