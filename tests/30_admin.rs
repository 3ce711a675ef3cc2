mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use campus_api::auth;
use campus_api::identity::Role;
use campus_api::store::CredentialStore;
use common::course_payload;
use serde_json::json;

fn user_payload(email: &str, role: &str) -> serde_json::Value {
    json!({
        "email": email,
        "password": "changeme-soon",
        "role": role,
        "display_name": email,
    })
}

#[tokio::test]
async fn admin_routes_reject_anonymous_and_non_admin_callers() -> Result<()> {
    let app = common::spawn_app();
    app.seed_user("s@example.com", "student-pass", Role::Student)
        .await?;
    let student = app.login("s@example.com", "student-pass").await?;

    let (status, body) = app.get("/api/admin/users", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, body) = app.get("/api/admin/users", Some(&student)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");
    Ok(())
}

#[tokio::test]
async fn admin_can_create_and_list_accounts() -> Result<()> {
    let app = common::spawn_app();
    app.seed_user("root@example.com", "admin-pass", Role::Admin)
        .await?;
    let admin = app.login("root@example.com", "admin-pass").await?;

    let (status, body) = app
        .post(
            "/api/admin/users",
            Some(&admin),
            user_payload("new.teacher@example.com", "teacher"),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["email"], "new.teacher@example.com");
    assert_eq!(body["data"]["role"], "teacher");
    assert!(body["data"].get("password_hash").is_none());

    let (status, body) = app.get("/api/admin/users", Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    // and the new account works
    let token = app.login("new.teacher@example.com", "changeme-soon").await?;
    let (status, _) = app.get("/api/teacher/courses", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn duplicate_emails_conflict_across_roles() -> Result<()> {
    let app = common::spawn_app();
    app.seed_user("root@example.com", "admin-pass", Role::Admin)
        .await?;
    app.seed_user("taken@example.com", "student-pass", Role::Student)
        .await?;
    let admin = app.login("root@example.com", "admin-pass").await?;

    let (status, body) = app
        .post(
            "/api/admin/users",
            Some(&admin),
            user_payload("taken@example.com", "teacher"),
        )
        .await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn malformed_account_details_are_rejected() -> Result<()> {
    let app = common::spawn_app();
    app.seed_user("root@example.com", "admin-pass", Role::Admin)
        .await?;
    let admin = app.login("root@example.com", "admin-pass").await?;

    let (status, body) = app
        .post(
            "/api/admin/users",
            Some(&admin),
            json!({
                "email": "not-an-email",
                "password": "short",
                "role": "student",
                "display_name": "X",
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["email"].is_string());
    assert!(body["field_errors"]["password"].is_string());
    Ok(())
}

#[tokio::test]
async fn deleting_a_teacher_revokes_sessions_but_keeps_courses() -> Result<()> {
    let app = common::spawn_app();
    app.seed_user("root@example.com", "admin-pass", Role::Admin)
        .await?;
    let teacher_id = app
        .seed_user("t@example.com", "teacher-pass", Role::Teacher)
        .await?;
    let admin = app.login("root@example.com", "admin-pass").await?;
    let teacher = app.login("t@example.com", "teacher-pass").await?;

    let (_, created) = app
        .post("/api/teacher/courses", Some(&teacher), course_payload("Harmony"))
        .await?;
    let course_id = created["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/admin/users/{}", teacher_id),
            Some(&admin),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    // the deleted teacher's session is gone
    let (status, _) = app.get("/api/auth/whoami", Some(&teacher)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // so is the account itself
    let (status, _) = app
        .post(
            "/auth/login",
            None,
            json!({ "email": "t@example.com", "password": "teacher-pass" }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // the course survives, still attributed to the departed owner
    let course = app
        .store
        .find_course_by_id(course_id.parse()?)
        .await?
        .unwrap();
    assert_eq!(course.teacher_id, teacher_id);
    Ok(())
}

#[tokio::test]
async fn deleting_a_missing_account_is_not_found() -> Result<()> {
    let app = common::spawn_app();
    app.seed_user("root@example.com", "admin-pass", Role::Admin)
        .await?;
    let admin = app.login("root@example.com", "admin-pass").await?;

    let (status, body) = app
        .request(
            Method::DELETE,
            "/api/admin/users/00000000-0000-0000-0000-000000000000",
            Some(&admin),
            None,
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn an_empty_store_gets_a_seeded_admin_that_can_log_in() -> Result<()> {
    let app = common::spawn_app();
    auth::ensure_default_admin(app.store.as_ref()).await?;

    let admin = app.login("admin@campus.local", "admin123").await?;
    let (status, _) = app.get("/api/admin/users", Some(&admin)).await?;
    assert_eq!(status, StatusCode::OK);
    Ok(())
}
