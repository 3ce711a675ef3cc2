use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::gate;
use crate::courses;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::AppState;

/// GET /api/student/courses - browse the full course catalog
pub async fn course_catalog(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    gate::require_student(&identity)?;

    let courses = courses::course_catalog(state.store.as_ref()).await?;

    Ok(Json(json!({
        "success": true,
        "data": courses,
    })))
}

/// POST /api/student/courses/:id/enroll - enroll the caller in a course
pub async fn course_enroll(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = gate::require_student(&identity)?;

    let enrollment = courses::enroll(state.store.as_ref(), user.id, course_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": enrollment,
        })),
    ))
}

/// GET /api/student/enrollments - courses the caller is enrolled in
pub async fn enrollment_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let user = gate::require_student(&identity)?;

    let courses = courses::enrolled_courses(state.store.as_ref(), user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": courses,
    })))
}
