//! # Vault
//!
//! Persistence API of the submission relay. Owns the only durable state.
//!
//! ## Endpoints
//!
//! | Route | Meaning |
//! |---|---|
//! | `POST /api/postdata/db` | insert, 201 |
//! | `PUT /api/postdata/db` | upsert by mobile, 201 when it had to create, 200 when it updated |
//! | `DELETE /api/postdata/db` | delete by mobile, 404 when nothing matched |
//! | `GET /api/getdata/db` | every record, newest first, with a count |
//! | `GET /health` | store connectivity and record count |
//!
//! ## Writes on one mobile
//!
//! Upsert is a lookup followed by a write. Every write takes the lock stripe
//! of its mobile first (see [`locks`]), so a concurrent delete or second upsert
//! on the same mobile waits instead of interleaving. This holds within one
//! vault process only.
//!
//! ## Environment
//!
//! - `RUST_PORT`: listen port, default 5000
//! - `REDIS_URL`: Redis connection string, also read from `/run/secrets/REDIS_URL`.
//!   Without it records live in memory and vanish on restart.
//! - `RUST_LOG`: tracing filter
use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use form::server::{init_tracing, shutdown_signal};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod config;
pub mod database;
pub mod error;
pub mod locks;
pub mod memory;
pub mod models;
pub mod records;
pub mod routes;
pub mod state;

use config::Config;
use error::panic_response;
use routes::{
    delete_handler, health_handler, insert_handler, list_handler, not_found_handler,
    upsert_handler,
};
use state::AppState;

pub const ENDPOINTS: [&str; 5] = [
    "POST /api/postdata/db",
    "PUT /api/postdata/db",
    "DELETE /api/postdata/db",
    "GET /api/getdata/db",
    "GET /health",
];

pub fn router(state: std::sync::Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route(
            "/api/postdata/db",
            post(insert_handler).put(upsert_handler).delete(delete_handler),
        )
        .route("/api/getdata/db", get(list_handler))
        .route("/health", get(health_handler))
        .fallback(not_found_handler)
        .method_not_allowed_fallback(not_found_handler)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    init_tracing();

    info!("Initializing state...");
    let state = AppState::new(Config::load()?).await?;
    info!("Record store: {}", state.records.backend());

    info!("Starting server...");
    let app = router(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}
