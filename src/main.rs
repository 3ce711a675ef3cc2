use std::sync::Arc;

use campus_api::store::{memory::MemoryStore, postgres::PgStore, CredentialStore};
use campus_api::{app, auth, config, AppState};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL etc.
    let _ = dotenvy::dotenv();

    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Campus API in {:?} mode", config.environment);

    let store: Arc<dyn CredentialStore> = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pg = PgStore::connect(&url)
                .await
                .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));
            Arc::new(pg)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, falling back to in-memory store");
            Arc::new(MemoryStore::new())
        }
    };

    if let Err(e) = auth::ensure_default_admin(store.as_ref()).await {
        tracing::error!("failed to seed default admin account: {}", e);
    }

    let app = app(AppState { store });

    // Allow tests or deployments to override port via env
    let port = std::env::var("CAMPUS_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Campus API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
