//! HTTP layer with Axum routes.
//!
//! This crate provides:
//! - The upload and download routes
//! - The health endpoint
//! - Mapping of storage failures to plain-text HTTP errors
//! - The static UI fallback

pub mod error;
pub mod routes;

use std::path::Path;
use std::sync::Arc;

use axum::Router;
use fish_core::storage::StorageService;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Storage service for uploaded files.
    pub storage: Arc<StorageService>,
}

impl AppState {
    /// Create state around a storage service.
    #[must_use]
    pub fn new(storage: StorageService) -> Self {
        Self {
            storage: Arc::new(storage),
        }
    }
}

/// Creates the main application router.
///
/// Paths not claimed by a route are served from `static_dir` when given.
pub fn create_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let router = routes::routes(&state);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
