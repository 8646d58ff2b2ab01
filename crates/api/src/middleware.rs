//! Request authentication layer.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use pipecrm_auth::AuthGateway;

use crate::app::errors::ApiError;

#[derive(Clone)]
pub struct AuthState {
    pub gateway: Arc<AuthGateway>,
}

/// Resolve the caller's identity from the `Authorization` header and stash
/// it in request extensions for the handlers behind this layer.
///
/// Any resolution failure short-circuits with 401; handlers behind this
/// layer can rely on the [`pipecrm_auth::Identity`] extension being present.
pub async fn require_identity(
    State(state): State<AuthState>,
    mut request: Request,
    next: Next,
) -> Response {
    let resolved = {
        let header = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        state.gateway.resolve_identity(header)
    };

    match resolved {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(_) => ApiError::Unauthorized.into_response(),
    }
}
