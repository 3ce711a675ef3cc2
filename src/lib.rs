use std::sync::Arc;

use axum::{routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod auth;
pub mod config;
pub mod courses;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod middleware;
pub mod password;
pub mod store;

use store::CredentialStore;

/// Shared application state: one handle to the credential store, cloned per
/// request. Request-scoped data (the resolved identity) travels through
/// request extensions, never through globals.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CredentialStore>,
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Public auth routes (token acquisition)
        .merge(auth_public_routes())
        // Protected API, gated per-route by role
        .merge(auth_routes())
        .merge(student_routes())
        .merge(teacher_routes())
        .merge(admin_routes())
        // Session resolution runs for every route; it injects an Identity
        // (possibly anonymous) and never denies by itself
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::resolve_session,
        ))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::public::auth;

    Router::new().route("/auth/login", post(auth::login))
}

fn auth_routes() -> Router<AppState> {
    use axum::routing::delete;
    use handlers::protected::auth;

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/session", delete(auth::logout))
}

fn student_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::protected::student;

    Router::new()
        .route("/api/student/courses", get(student::course_catalog))
        .route(
            "/api/student/courses/:id/enroll",
            post(student::course_enroll),
        )
        .route("/api/student/enrollments", get(student::enrollment_list))
}

fn teacher_routes() -> Router<AppState> {
    use handlers::protected::teacher;

    Router::new()
        .route(
            "/api/teacher/courses",
            get(teacher::course_list).post(teacher::course_create),
        )
        .route(
            "/api/teacher/courses/:id",
            get(teacher::course_get).put(teacher::course_update),
        )
}

fn admin_routes() -> Router<AppState> {
    use axum::routing::delete;
    use handlers::protected::admin;

    Router::new()
        .route(
            "/api/admin/users",
            get(admin::user_list).post(admin::user_create),
        )
        .route("/api/admin/users/:id", delete(admin::user_delete))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Campus API",
            "version": version,
            "description": "Role-gated course management backend",
            "endpoints": {
                "home": "/ (public)",
                "login": "/auth/login (public - token acquisition)",
                "auth": "/api/auth/* (any authenticated user)",
                "student": "/api/student/* (student role)",
                "teacher": "/api/teacher/* (teacher role)",
                "admin": "/api/admin/* (admin role)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "store": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "store unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "store_error": e.to_string()
                }
            })),
        ),
    }
}
