//! `/reports` handlers — global aggregates, no auth enforced.
//!
//! Empty datasets answer 404 rather than an empty body; clients render the
//! "no data yet" state off the status code.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Extension, Json};
use serde::Serialize;

use pipecrm_reports::{ConversionReport, MonthlyRevenue, ReportSummary};

use crate::app::errors::ApiError;
use crate::app::services::AppServices;

const TOP_SALES_LIMIT: usize = 5;

pub async fn deals_by_stage(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<BTreeMap<String, u64>>, ApiError> {
    let deals = services.deals.list_all().await?;
    if deals.is_empty() {
        return Err(ApiError::not_found("No deals found"));
    }
    Ok(Json(pipecrm_reports::deals_by_stage(&deals)))
}

pub async fn revenue_by_month(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<MonthlyRevenue>>, ApiError> {
    let deals = services.deals.list_all().await?;
    let months = pipecrm_reports::revenue_by_month(&deals);
    if months.is_empty() {
        return Err(ApiError::not_found("No revenue data found"));
    }
    Ok(Json(months))
}

/// A leaderboard row with the owner id resolved back to an address.
#[derive(Debug, Serialize)]
pub struct TopSalesRow {
    pub email: String,
    pub deals_won: usize,
    pub revenue: f64,
}

pub async fn top_sales(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<Vec<TopSalesRow>>, ApiError> {
    let deals = services.deals.list_all().await?;
    let leaders = pipecrm_reports::top_sales(&deals, TOP_SALES_LIMIT);
    if leaders.is_empty() {
        return Err(ApiError::not_found("No sales data found"));
    }

    let mut rows = Vec::with_capacity(leaders.len());
    for leader in leaders {
        let email = services
            .users
            .find_by_id(leader.owner_id)
            .await?
            .map(|user| user.email)
            // Deals survive their owner's account; keep the row attributable.
            .unwrap_or_else(|| leader.owner_id.to_string());
        rows.push(TopSalesRow {
            email,
            deals_won: leader.deals_won,
            revenue: leader.revenue,
        });
    }

    Ok(Json(rows))
}

pub async fn conversion_rate(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<ConversionReport>, ApiError> {
    let lead_count = services.leads.count_all().await?;
    let deals = services.deals.list_all().await?;
    Ok(Json(pipecrm_reports::conversion_rate(lead_count, &deals)))
}

/// Global counterpart of the dashboard report: the whole funnel, every owner.
pub async fn generate_report(
    Extension(services): Extension<Arc<AppServices>>,
) -> Result<Json<ReportSummary>, ApiError> {
    let lead_count = services.leads.count_all().await?;
    let deals = services.deals.list_all().await?;
    Ok(Json(pipecrm_reports::summary(lead_count, &deals)))
}
