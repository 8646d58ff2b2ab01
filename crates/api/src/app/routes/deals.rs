//! `/deals` handlers.
//!
//! Ownership is resolved from the bearer identity on every operation,
//! reads and deletes included.

use std::sync::Arc;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use pipecrm_activity::ActivityRecord;
use pipecrm_auth::Identity;
use pipecrm_core::{DealId, StoreError};
use pipecrm_deals::{Deal, DealPatch, NewDeal};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Vec<Deal>>, ApiError> {
    let owner = services.auth.user_id(&identity).await?;
    let deals = services.deals.list(owner).await?;
    Ok(Json(deals))
}

pub async fn get_one(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<DealId>,
) -> Result<Json<Deal>, ApiError> {
    let owner = services.auth.user_id(&identity).await?;
    let deal = services
        .deals
        .get(id, owner)
        .await?
        .ok_or_else(|| ApiError::not_found("Deal not found"))?;
    Ok(Json(deal))
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(new): Json<NewDeal>,
) -> Result<impl IntoResponse, ApiError> {
    let owner = services.auth.user_id(&identity).await?;
    let deal = services.deals.insert(Deal::create(owner, new)).await?;

    services
        .recorder
        .record(ActivityRecord::deal_created(&identity.email, &deal))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Deal created successfully", "deal": deal })),
    ))
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<DealId>,
    Json(patch): Json<DealPatch>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    let owner = services.auth.user_id(&identity).await?;
    let deal = match services.deals.update(id, owner, &patch).await {
        Ok(deal) => deal,
        Err(StoreError::NotFound) => return Err(ApiError::not_found("Deal not found")),
        Err(e) => return Err(e.into()),
    };

    // The won check looks at the updated row, so an update that merely
    // touches a deal already sitting in "won" records another win entry.
    services
        .recorder
        .record(ActivityRecord::deal_updated(&identity.email, &deal))
        .await;

    Ok(Json(
        json!({ "message": "Deal updated successfully", "deal": deal }),
    ))
}

pub async fn remove(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<DealId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let owner = services.auth.user_id(&identity).await?;
    match services.deals.delete(id, owner).await {
        Ok(()) => Ok(Json(json!({ "message": "Deal deleted successfully" }))),
        Err(StoreError::NotFound) => Err(ApiError::not_found("Deal not found")),
        Err(e) => Err(e.into()),
    }
}
