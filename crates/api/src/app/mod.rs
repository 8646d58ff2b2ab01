//! Router assembly.

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use std::sync::Arc;

use axum::routing::{get, post, put};
use axum::{Extension, Router, middleware as axum_middleware};

pub use services::AppServices;

use crate::middleware::{AuthState, require_identity};
use routes::{auth, dashboard, deals, leads, reports, system};

/// Build the full application router over an assembled service graph.
///
/// Two route groups: the public surface (health, signup/login, global
/// reports) and everything else behind the identity layer.
pub fn build_app(services: Arc<AppServices>) -> Router {
    let auth_state = AuthState {
        gateway: services.auth.clone(),
    };

    let public = Router::new()
        .route("/health", get(system::health))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/reports/deals-by-stage", get(reports::deals_by_stage))
        .route("/reports/revenue-by-month", get(reports::revenue_by_month))
        .route("/reports/top-sales", get(reports::top_sales))
        .route("/reports/conversion-rate", get(reports::conversion_rate))
        .route("/reports/generate-report", get(reports::generate_report));

    let protected = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/auth/profile", get(auth::profile))
        .route("/auth/update-profile", put(auth::update_profile))
        .route("/leads", get(leads::list).post(leads::create))
        .route("/leads/export", get(leads::export))
        .route("/leads/import", post(leads::import))
        .route("/leads/:id", put(leads::update))
        .route("/deals", get(deals::list).post(deals::create))
        .route(
            "/deals/:id",
            get(deals::get_one)
                .put(deals::update)
                .delete(deals::remove),
        )
        .route("/dashboard/stats", get(dashboard::stats))
        .route("/dashboard/activities", get(dashboard::activities))
        .route(
            "/dashboard/generate-report",
            get(dashboard::generate_report),
        )
        .route("/dashboard/send-campaign", post(dashboard::send_campaign))
        .route("/dashboard/sync-data", post(dashboard::sync_data))
        .route_layer(axum_middleware::from_fn_with_state(
            auth_state,
            require_identity,
        ));

    public.merge(protected).layer(Extension(services))
}
