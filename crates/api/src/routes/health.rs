//! Health check endpoint.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use serde::Serialize;

use crate::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: `healthy` or `degraded`.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Whether the storage root is a reachable directory.
    pub storage: &'static str,
}

/// Reports `503` when the storage root is gone, since uploads would fail.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let root_ok = tokio::fs::metadata(state.storage.layout().root())
        .await
        .is_ok_and(|meta| meta.is_dir());

    let (code, status, storage) = if root_ok {
        (StatusCode::OK, "healthy", "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            storage,
        }),
    )
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
