//! Download routes.
//!
//! `GET|HEAD /download/{id}/{name}` serves a stored file as an attachment.
//! Every shorter path under `/download` is refused rather than listed.

use axum::{
    Router,
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderValue, StatusCode, header},
    response::Response,
    routing::{any, get},
};
use fish_core::storage::{DOWNLOAD_PREFIX, StorageError};
use tower::ServiceExt;
use tower_http::services::ServeFile;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing::debug;

use crate::{AppState, error::ApiError};

/// Creates the download routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(&format!("{DOWNLOAD_PREFIX}/{{id}}/{{name}}"), get(download))
        .route(DOWNLOAD_PREFIX, any(refuse_listing))
        .route(&format!("{DOWNLOAD_PREFIX}/"), any(refuse_listing))
        .route(&format!("{DOWNLOAD_PREFIX}/{{id}}"), any(refuse_listing))
        .route(&format!("{DOWNLOAD_PREFIX}/{{id}}/"), any(refuse_listing))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
}

/// Streams the file; length, type, ranges and conditional requests are
/// handled by [`ServeFile`].
async fn download(
    State(state): State<AppState>,
    Path((id, name)): Path<(String, String)>,
    request: Request,
) -> Result<Response, ApiError> {
    let path = state.storage.locate(&id, &name).await?;
    debug!(id = %id, path = %path.display(), "serving download");

    let Ok(response) = ServeFile::new(&path).oneshot(request).await;
    let mut response = response.map(Body::new);
    // Removed by the reaper after `locate`: keep ServeFile's 404 as is.
    if response.status() != StatusCode::NOT_FOUND {
        response.headers_mut().insert(
            header::CONTENT_DISPOSITION,
            HeaderValue::from_static("attachment"),
        );
    }
    Ok(response)
}

async fn refuse_listing() -> ApiError {
    ApiError::from(StorageError::IsDirectory)
}
