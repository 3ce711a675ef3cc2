use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::gate;
use crate::courses::{self, CourseDraft};
use crate::error::ApiError;
use crate::identity::Identity;
use crate::AppState;

/// GET /api/teacher/courses - courses owned by the authenticated teacher
pub async fn course_list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, ApiError> {
    let user = gate::require_teacher(&identity)?;

    let courses = courses::list_owned_courses(state.store.as_ref(), user.id).await?;

    Ok(Json(json!({
        "success": true,
        "data": courses,
    })))
}

/// POST /api/teacher/courses - create a course owned by the caller
///
/// The owner is stamped from the authenticated identity; any teacher_id in
/// the payload is ignored.
pub async fn course_create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(draft): Json<CourseDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let user = gate::require_teacher(&identity)?;

    let course = courses::create_course(state.store.as_ref(), user.id, draft).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": course,
        })),
    ))
}

/// GET /api/teacher/courses/:id - fetch an owned course for editing
pub async fn course_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(course_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = gate::require_teacher(&identity)?;

    let course = courses::get_course_for_edit(state.store.as_ref(), user.id, course_id).await?;

    Ok(Json(json!({
        "success": true,
        "data": course,
    })))
}

/// PUT /api/teacher/courses/:id - update an owned course
pub async fn course_update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(course_id): Path<Uuid>,
    Json(draft): Json<CourseDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let user = gate::require_teacher(&identity)?;

    let course =
        courses::update_course(state.store.as_ref(), user.id, course_id, draft).await?;

    Ok(Json(json!({
        "success": true,
        "data": course,
    })))
}
