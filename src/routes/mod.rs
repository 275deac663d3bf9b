//! API route handlers.
//!
//! - `health`: liveness and readiness probes
//! - `process`: the EPUB hyphenation pipeline endpoint

pub mod health;
pub mod process;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

/// Root endpoint: service name, version, and available endpoints.
pub async fn api_info() -> impl IntoResponse {
    Json(json!({
        "name": "epub-hyphen-server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "/api/process-epub",
            "/health",
            "/ready",
        ]
    }))
}

/// Fallback for undefined routes. Same JSON error shape as the pipeline.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Not found",
            "success": false,
        })),
    )
}
