use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{self, gate};
use crate::error::ApiError;
use crate::identity::{Identity, Role};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    pub display_name: String,
}

/// GET /api/admin/users - list all accounts
pub async fn user_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    gate::require_admin(&identity)?;

    let users = state.store.list_users().await?;

    Ok(Json(json!({
        "success": true,
        "data": users,
    })))
}

/// POST /api/admin/users - create an account with a fixed role
pub async fn user_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    gate::require_admin(&identity)?;

    let user = auth::create_user(
        state.store.as_ref(),
        &payload.email,
        &payload.password,
        payload.role,
        &payload.display_name,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": user,
        })),
    ))
}

/// DELETE /api/admin/users/:id - delete an account
///
/// The account's sessions and enrollments go with it; courses it owned
/// stay behind, frozen.
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    gate::require_admin(&identity)?;

    auth::delete_user(state.store.as_ref(), user_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": { "deleted": user_id }
    })))
}
