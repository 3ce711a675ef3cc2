use axum::{
    extract::{Extension, State},
    http::HeaderMap,
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::auth::{self, gate};
use crate::error::ApiError;
use crate::identity::Identity;
use crate::middleware::auth::bearer_token;
use crate::AppState;

/// GET /api/auth/whoami - the identity behind the presented session token
pub async fn whoami(
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let user = gate::require_authenticated(&identity)?;

    Ok(Json(json!({
        "success": true,
        "data": user,
    })))
}

/// DELETE /api/auth/session - destroy the presented session
///
/// Deliberately not gated: logging out an already-dead session must
/// succeed, so a second logout with the same token is a no-op.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        auth::logout(state.store.as_ref(), &token).await?;
    }

    Ok(Json(json!({
        "success": true,
        "data": { "logged_out": true }
    })))
}
