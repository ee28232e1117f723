//! Sync service for MGNREGA district statistics.
//!
//! Pulls welfare-scheme records from the data.gov.in API for a fixed set of
//! Uttar Pradesh districts and persists them into a hosted document store.
//!
//! # Endpoints
//! - `POST /api/sync/:district`: sync one district
//! - `POST /api/sync-all`: sync the fixed district list, sequentially
//! - `GET /api/data`: list all stored records
//! - `GET /api/data/:district`: list records for one district
//! - `GET /health`: liveness
//! - `GET /`: service descriptor
//!
//! Districts sync strictly one at a time with a pause in between; the
//! external API is rate-limited and a batch must never hammer it.

use std::time::Duration;

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::{get, post},
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod config;
pub mod error;
pub mod fetch;
pub mod normalize;
pub mod routes;
pub mod state;
pub mod store;
pub mod sync;

#[cfg(test)]
pub mod testutil;

use routes::{
    data_handler, district_data_handler, health_handler, root_handler, sync_all_handler,
    sync_district_handler,
};
use state::AppState;

pub async fn start_server() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Initializing state...");
    let state = AppState::new();

    info!("Starting server...");

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/sync/:district", post(sync_district_handler))
        .route("/api/sync-all", post(sync_all_handler))
        .route("/api/data", get(data_handler))
        .route("/api/data/:district", get(district_data_handler))
        .layer(cors)
        .with_state(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await.unwrap();
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap();

    println!("Server shutting down...");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
