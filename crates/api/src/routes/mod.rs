//! Route definitions.

use axum::Router;

use crate::AppState;

pub mod download;
pub mod health;
pub mod upload;

/// Creates the router with all routes.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(upload::routes(state.storage.config().max_upload_bytes))
        .merge(download::routes())
}
