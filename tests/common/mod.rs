use std::sync::Arc;

use anyhow::{ensure, Context, Result};
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use campus_api::identity::Role;
use campus_api::store::memory::MemoryStore;
use campus_api::{app, auth, AppState};

/// In-process test application over an in-memory store: requests go
/// straight through the real router, middleware, and gate.
pub struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
}

pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let router = app(AppState {
        store: store.clone(),
    });
    TestApp { router, store }
}

impl TestApp {
    /// Seed an account directly through the auth core, bypassing HTTP.
    pub async fn seed_user(&self, email: &str, password: &str, role: Role) -> Result<Uuid> {
        let user = auth::create_user(self.store.as_ref(), email, password, role, email).await?;
        Ok(user.id)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String> {
        let (status, body) = self
            .request(
                Method::POST,
                "/auth/login",
                None,
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await?;
        ensure!(status == StatusCode::OK, "login failed: {} {}", status, body);

        body["data"]["token"]
            .as_str()
            .map(str::to_string)
            .context("token missing from login response")
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(v) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&v)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, value))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> Result<(StatusCode, Value)> {
        self.request(Method::POST, uri, token, Some(body)).await
    }
}

/// A plausible course creation payload.
pub fn course_payload(name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "description": "A survey course",
        "subject": "Music",
        "start_date": "2026-09-01",
        "end_date": "2026-12-18",
    })
}
