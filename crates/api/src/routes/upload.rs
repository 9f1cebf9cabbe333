//! Upload route.
//!
//! `POST /upload` takes a multipart form with a `file` field, streams the
//! field into storage and answers with the retrieval path as plain text.
//! The path is sent in the body rather than as a redirect: browser upload
//! APIs cannot observe a redirect target while reporting progress.

use std::io;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::post,
};
use futures::TryStreamExt;
use fish_shared::AppError;
use tokio_util::io::StreamReader;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

use crate::{AppState, error::ApiError};

/// Multipart field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

const MISSING_FILE: &str = "missing `file` field, or field was not a file";

/// Creates the upload route, capping request bodies at `max_upload_bytes`.
pub fn routes(max_upload_bytes: u64) -> Router<AppState> {
    let limit = usize::try_from(max_upload_bytes).unwrap_or(usize::MAX);

    Router::new()
        .route("/upload", post(upload).fallback(only_post))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(limit))
}

async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        AppError::BadRequest(format!("expected a multipart form: {}", rejection.body_text()))
    })?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // Browsers send an empty filename when no file was picked.
        let Some(filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(ToOwned::to_owned)
        else {
            return Err(AppError::BadRequest(MISSING_FILE.to_string()).into());
        };

        let reader = StreamReader::new(field.map_err(io::Error::other));
        tokio::pin!(reader);

        let entry = state.storage.store(&filename, reader).await?;
        info!(
            id = %entry.id,
            name = %entry.display_name,
            size = entry.size,
            "upload stored"
        );

        return Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            entry.download_path(),
        ));
    }

    Err(AppError::BadRequest(MISSING_FILE.to_string()).into())
}

async fn only_post() -> impl IntoResponse {
    (
        [(header::ALLOW, "POST")],
        ApiError::from(AppError::MethodNotAllowed(
            "only POST requests accepted".to_string(),
        )),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request};
    use fish_core::storage::{StorageConfig, StorageService};
    use tempfile::TempDir;
    use tower::ServiceExt;

    const BOUNDARY: &str = "fish-test-boundary";

    fn app(dir: &TempDir, max: u64) -> Router {
        let storage =
            StorageService::new(StorageConfig::new(dir.path()).with_max_upload_bytes(max));
        routes(max).with_state(AppState::new(storage))
    }

    fn multipart_body(field: &str, filename: Option<&str>, content: &[u8]) -> Vec<u8> {
        let disposition = match filename {
            Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
            None => format!("form-data; name=\"{field}\""),
        };
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn upload_request(body: Vec<u8>) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_upload_returns_download_path() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, 1024)
            .oneshot(upload_request(multipart_body("file", Some("report.pdf"), b"PDF-DATA")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );

        let path = body_text(response).await;
        let rest = path.strip_prefix("/download/").expect("download prefix");
        let (id, name) = rest.split_once('/').expect("id and name");
        assert_eq!(id.len(), 32);
        assert_eq!(name, "report.pdf");
        assert_eq!(
            std::fs::read(dir.path().join(id).join(name)).unwrap(),
            b"PDF-DATA"
        );
    }

    #[tokio::test]
    async fn test_upload_escapes_name_in_path() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, 1024)
            .oneshot(upload_request(multipart_body("file", Some("my report (1).pdf"), b"x")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.ends_with("/my%20report%20%281%29.pdf"));
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, 1024)
            .oneshot(upload_request(multipart_body("other", Some("a.txt"), b"x")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, MISSING_FILE);
    }

    #[tokio::test]
    async fn test_upload_file_field_without_filename() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, 1024)
            .oneshot(upload_request(multipart_body("file", None, b"x")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_empty_filename_is_missing_file() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, 1024)
            .oneshot(upload_request(multipart_body("file", Some(""), b"data")))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, MISSING_FILE);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_upload_requires_multipart() {
        let dir = TempDir::new().unwrap();
        let request = Request::builder()
            .method(Method::POST)
            .uri("/upload")
            .header(header::CONTENT_TYPE, "text/plain")
            .body(Body::from("hello"))
            .unwrap();

        let response = app(&dir, 1024).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_upload_rejects_other_methods() {
        let dir = TempDir::new().unwrap();
        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let request = Request::builder()
                .method(method)
                .uri("/upload")
                .body(Body::empty())
                .unwrap();

            let response = app(&dir, 1024).oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers()[header::ALLOW], "POST");
            assert_eq!(body_text(response).await, "only POST requests accepted");
        }
    }

    #[tokio::test]
    async fn test_upload_over_limit_persists_nothing() {
        let dir = TempDir::new().unwrap();
        let body = multipart_body("file", Some("big.bin"), &[b'x'; 4096]);

        let response = app(&dir, 1024).oneshot(upload_request(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
