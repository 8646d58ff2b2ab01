//! `/leads` handlers.
//!
//! Every operation is scoped to the caller's email; a lead owned by someone
//! else is indistinguishable from a missing one.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use pipecrm_activity::ActivityRecord;
use pipecrm_auth::Identity;
use pipecrm_core::{LeadId, StoreError};
use pipecrm_leads::{Lead, LeadPatch, NewLead};

use crate::app::dto::LeadListParams;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::csv;

pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<LeadListParams>,
) -> Result<Json<Vec<Lead>>, ApiError> {
    let query = params.into_query();
    let leads = services.leads.list(&identity.email, &query).await?;
    Ok(Json(leads))
}

pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(new): Json<NewLead>,
) -> Result<impl IntoResponse, ApiError> {
    let lead = services
        .leads
        .insert(Lead::create(&identity.email, new))
        .await?;

    services
        .recorder
        .record(ActivityRecord::lead_created(&identity.email, &lead))
        .await;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Lead created successfully", "lead": lead })),
    ))
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<LeadId>,
    Json(patch): Json<LeadPatch>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if patch.is_empty() {
        return Err(ApiError::validation("No fields to update"));
    }

    let lead = match services.leads.update(id, &identity.email, &patch).await {
        Ok(lead) => lead,
        Err(StoreError::NotFound) => {
            return Err(ApiError::not_found(
                "Lead not found or not owned by current user",
            ));
        }
        Err(e) => return Err(e.into()),
    };

    services
        .recorder
        .record(ActivityRecord::lead_updated(&identity.email, &lead))
        .await;

    Ok(Json(
        json!({ "message": "Lead updated successfully", "lead": lead }),
    ))
}

/// Everything the caller owns, as a CSV attachment.
pub async fn export(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let leads = services.leads.list_all(&identity.email).await?;
    let body = csv::render_leads(&leads);

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=leads.csv",
            ),
        ],
        body,
    ))
}

/// Bulk ingest from an uploaded CSV file. Ownership of every imported row
/// is the importer, whatever the file claims.
pub async fn import(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut content: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let is_csv = field
            .file_name()
            .is_some_and(|name| name.to_ascii_lowercase().ends_with(".csv"));
        if !is_csv {
            return Err(ApiError::validation("Only CSV files allowed"));
        }

        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(e.to_string()))?;
        let text = String::from_utf8(bytes.to_vec())
            .map_err(|_| ApiError::validation("CSV file must be UTF-8"))?;
        content = Some(text);
        break;
    }

    let content = content.ok_or_else(|| ApiError::validation("missing file field"))?;
    let rows = csv::parse_leads(&content);
    if rows.is_empty() {
        return Err(ApiError::validation("CSV file is empty"));
    }

    let leads: Vec<Lead> = rows
        .into_iter()
        .map(|new| Lead::create(&identity.email, new))
        .collect();
    let count = services.leads.insert_many(leads).await?;

    Ok(Json(
        json!({ "message": "Leads imported successfully", "count": count }),
    ))
}
