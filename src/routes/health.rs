use crate::state::ServerState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use std::time::SystemTime;

/// Server start time for uptime reporting
static SERVER_START_TIME: once_cell::sync::Lazy<SystemTime> =
    once_cell::sync::Lazy::new(SystemTime::now);

fn uptime_seconds() -> u64 {
    SERVER_START_TIME.elapsed().map(|d| d.as_secs()).unwrap_or(0)
}

/// Liveness probe: 200 whenever the process is serving.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "service": "epub-hyphen-server",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds(),
    }))
}

/// Readiness probe: checks the scratch directory is present, since every
/// request stages artifacts there. 503 when it is not.
pub async fn readiness_check(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    let scratch_ready = tokio::fs::metadata(state.scratch.dir())
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let status = if scratch_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if scratch_ready { "ready" } else { "degraded" },
            "service": "epub-hyphen-server",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "uptime_seconds": uptime_seconds(),
            "components": {
                "api": "ready",
                "scratch_dir": if scratch_ready { "ready" } else { "unavailable" },
            }
        })),
    )
}
