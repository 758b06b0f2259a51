//! # Relay
//!
//! Validation and dispatch API. Stateless: it checks a submitted form,
//! derives the age, stamps `processedAt` and hands the record to the vault
//! under the verb its action maps to.
//!
//! | Action | Vault operation | Verb |
//! |---|---|---|
//! | create | insert | `POST` |
//! | update | upsert | `PUT` |
//! | delete | delete | `DELETE` |
//!
//! ## Responses of `POST /api/post`
//!
//! - 200: forwarded, with `processedData` and the vault's `downstreamResponse`
//! - 400: a field rule failed, nothing was forwarded
//! - 502: the form was fine but the vault failed, timed out or refused it;
//!   `processedData` still shows what was validated and the vault's own
//!   message is passed through in `error`
//! - 500: anything unexpected
//!
//! Vault failures are surfaced verbatim. That suits an internal admin tool
//! and would need revisiting before exposing the relay publicly.
//!
//! ## Environment
//!
//! - `RUST_PORT`: listen port, default 3000
//! - `VAULT_URL`: base URL of the vault, default `http://127.0.0.1:5000`
//! - `FORWARD_TIMEOUT_SECS`: bound on each vault call, default 10
//! - `RUST_LOG`: tracing filter
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use form::server::{init_tracing, shutdown_signal};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};
use tracing::info;

pub mod client;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use config::Config;
use error::panic_response;
use routes::{getdata_handler, health_handler, not_found_handler, post_handler};
use state::AppState;

pub const ENDPOINTS: [&str; 3] = ["POST /api/post", "GET /api/getdata", "GET /health"];

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/post", post(post_handler))
        .route("/api/getdata", get(getdata_handler))
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
    let state = AppState::new(Config::load()?)?;
    info!(
        "Forwarding to {} with a {:?} bound",
        state.config.vault_url, state.config.forward_timeout
    );

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
