use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde_json::{Value, json};

use crate::{config::DISTRICTS, error::AppError, state::AppState};

pub async fn sync_district_handler(
    State(state): State<Arc<AppState>>,
    Path(district): Path<String>,
) -> Result<Json<Value>, AppError> {
    let report = state.syncer.sync_district(&district).await?;

    Ok(Json(json!({
        "success": true,
        "message": format!("Synced {} records for {district}", report.synced),
        "total": report.total,
    })))
}

pub async fn sync_all_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    let results = state.syncer.sync_all(&DISTRICTS).await;

    Json(json!({ "results": results }))
}

pub async fn data_handler(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    let listing = state.store.list(None).await?;

    Ok(Json(json!({
        "success": true,
        "data": listing.documents,
        "total": listing.total,
    })))
}

pub async fn district_data_handler(
    State(state): State<Arc<AppState>>,
    Path(district): Path<String>,
) -> Result<Json<Value>, AppError> {
    let listing = state.store.list(Some(("district", &district))).await?;

    Ok(Json(json!({
        "success": true,
        "data": listing.documents,
        "total": listing.total,
    })))
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "environment": state.config.environment,
    }))
}

pub async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "MGNREGA district statistics sync service",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "sync": "POST /api/sync/:district",
            "sync_all": "POST /api/sync-all",
            "data": "GET /api/data",
            "district_data": "GET /api/data/:district",
            "health": "GET /health",
        },
    }))
}
