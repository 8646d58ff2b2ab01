//! `/auth` handlers.

use std::sync::Arc;

use axum::extract::Form;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use pipecrm_auth::{Identity, LoginGrant, Profile, ProfileUpdate};

use crate::app::dto::CredentialsForm;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;

pub async fn signup(
    Extension(services): Extension<Arc<AppServices>>,
    Form(form): Form<CredentialsForm>,
) -> Result<impl IntoResponse, ApiError> {
    services.auth.signup(&form.email, &form.password).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Form(form): Form<CredentialsForm>,
) -> Result<Json<LoginGrant>, ApiError> {
    let grant = services.auth.login(&form.email, &form.password).await?;
    Ok(Json(grant))
}

/// The identity baked into the presented token, nothing more. Does not hit
/// the store, so it stays valid for a deleted account until the token expires.
pub async fn me(Extension(identity): Extension<Identity>) -> Json<serde_json::Value> {
    Json(json!({ "email": identity.email }))
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<Profile>, ApiError> {
    let profile = services.auth.profile(&identity).await?;
    Ok(Json(profile))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(identity): Extension<Identity>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>, ApiError> {
    let profile = services.auth.update_profile(&identity, update).await?;
    Ok(Json(profile))
}
