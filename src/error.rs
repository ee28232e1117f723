use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Failure talking to the government data API. Never retried; the caller
/// records it as a failed outcome for that district.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {0} from data api")]
    Status(u16),
}

/// Failure talking to the document store. Swallowed per-record during sync,
/// fatal (500) for the read endpoints.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store rejected request: {status} {message}")]
    Rejected { status: u16, message: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Sync failed")]
    Sync(#[from] FetchError),

    #[error("Query failed")]
    Store(#[from] StoreError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::Sync(e) => e.to_string(),
            AppError::Store(e) => e.to_string(),
        };

        let body = json!({
            "error": self.to_string(),
            "message": message,
        });

        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}
