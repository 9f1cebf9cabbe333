//! HTTP error responses.
//!
//! Errors are answered with a plain-text body so that browser upload
//! scripts can show the message as-is.

use std::io;

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use fish_core::storage::StorageError;
use fish_shared::AppError;
use tracing::{error, warn};

/// Body sent for every 5xx; details stay in the log.
const INTERNAL_MESSAGE: &str = "internal server error";

/// Error returned by handlers.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl ApiError {
    /// The application error being reported.
    #[must_use]
    pub fn inner(&self) -> &AppError {
        &self.0
    }

    /// HTTP status of the response this error produces.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::InvalidId(_) | StorageError::NotFound(_) => {
                AppError::NotFound("file not found".to_string())
            }
            StorageError::InvalidName(_) | StorageError::OutsideRoot(_) => {
                AppError::Forbidden("forbidden path".to_string())
            }
            StorageError::IsDirectory => AppError::Forbidden(err.to_string()),
            StorageError::TooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            StorageError::Read { ref source } => {
                if hit_body_limit(source) {
                    AppError::PayloadTooLarge("upload exceeds maximum size".to_string())
                } else {
                    AppError::BadRequest(err.to_string())
                }
            }
            StorageError::IdGeneration(_)
            | StorageError::CreateDir { .. }
            | StorageError::CreateFile { .. }
            | StorageError::Write { .. }
            | StorageError::Io(_) => AppError::Internal(err.to_string()),
        };
        Self(app)
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        let app = if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("upload exceeds maximum size".to_string())
        } else {
            AppError::BadRequest(format!("malformed multipart body: {}", err.body_text()))
        };
        Self(app)
    }
}

/// Whether a read failure came from the request body limit.
fn hit_body_limit(source: &io::Error) -> bool {
    source
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<MultipartError>())
        .is_some_and(|e| e.status() == StatusCode::PAYLOAD_TOO_LARGE)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.0.error_code();

        let body = if self.0.is_client_error() {
            warn!(status = status.as_u16(), code, message = %self.0, "request rejected");
            self.0.to_string()
        } else {
            error!(status = status.as_u16(), code, message = %self.0, "request failed");
            INTERNAL_MESSAGE.to_string()
        };

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use rstest::rstest;
    use std::path::PathBuf;

    fn status_of(err: StorageError) -> StatusCode {
        ApiError::from(err).status()
    }

    #[rstest]
    #[case(StorageError::InvalidId("..".into()), StatusCode::NOT_FOUND)]
    #[case(StorageError::not_found("x/y"), StatusCode::NOT_FOUND)]
    #[case(StorageError::InvalidName("../etc".into()), StatusCode::FORBIDDEN)]
    #[case(StorageError::OutsideRoot(PathBuf::from("/etc")), StatusCode::FORBIDDEN)]
    #[case(StorageError::IsDirectory, StatusCode::FORBIDDEN)]
    #[case(StorageError::TooLarge { max: 1 }, StatusCode::PAYLOAD_TOO_LARGE)]
    #[case(
        StorageError::Read { source: io::Error::other("bad chunk") },
        StatusCode::BAD_REQUEST
    )]
    #[case(StorageError::id_generation("no entropy"), StatusCode::INTERNAL_SERVER_ERROR)]
    #[case(
        StorageError::create_dir("/tmp/x", io::Error::from(io::ErrorKind::PermissionDenied)),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case(
        StorageError::write("/tmp/x/y", io::Error::from(io::ErrorKind::StorageFull)),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn test_storage_error_status(#[case] err: StorageError, #[case] expected: StatusCode) {
        assert_eq!(status_of(err), expected);
    }

    #[tokio::test]
    async fn test_client_error_body_is_message() {
        let response = ApiError::from(StorageError::IsDirectory).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"directory enumeration is banned");
    }

    #[tokio::test]
    async fn test_server_error_body_hides_details() {
        let err = StorageError::create_dir(
            "/srv/secret/path",
            io::Error::from(io::ErrorKind::PermissionDenied),
        );
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], INTERNAL_MESSAGE.as_bytes());
    }
}
