//! Application-wide error types.

use thiserror::Error;

/// Application error types.
///
/// Every variant carries a human-readable message that is sent to the
/// client verbatim as a plain-text body.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or incomplete request.
    #[error("{0}")]
    BadRequest(String),

    /// Request body exceeds the configured upload limit.
    #[error("{0}")]
    PayloadTooLarge(String),

    /// HTTP method not supported by the endpoint.
    #[error("{0}")]
    MethodNotAllowed(String),

    /// Request violates a serving policy (directory listing, path escape).
    #[error("{0}")]
    Forbidden(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Internal server error.
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest(_) => 400,
            Self::Forbidden(_) => 403,
            Self::NotFound(_) => 404,
            Self::MethodNotAllowed(_) => 405,
            Self::PayloadTooLarge(_) => 413,
            Self::Internal(_) => 500,
        }
    }

    /// Returns the stable error code used in logs.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
            Self::MethodNotAllowed(_) => "METHOD_NOT_ALLOWED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the caller is at fault (4xx) rather than the server.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
