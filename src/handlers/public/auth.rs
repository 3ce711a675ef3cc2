use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /auth/login - exchange credentials for a session token
///
/// Unknown email and wrong password both come back as the same generic
/// 401; the response never says which factor failed.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("email and password are required"));
    }

    let outcome = auth::login(state.store.as_ref(), &payload.email, &payload.password).await?;

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": outcome.token,
            "user": outcome.user,
        }
    })))
}
