use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Client-facing error taxonomy. Every failure a handler can surface is one
/// of these; persistence and crypto failures are mapped into them at the
/// service boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed input. Client fault, no retry.
    #[error("{0}")]
    Validation(String),

    /// Credential mismatch or unknown identity. The message is identical for
    /// both causes so callers cannot enumerate registered names.
    #[error("Invalid name or password")]
    Auth,

    /// The request conflicts with current state (duplicate name,
    /// insufficient stock).
    #[error("{0}")]
    Conflict(String),

    /// A mutation targeted an absent row.
    #[error("{0}")]
    NotFound(String),

    /// Store unavailable, hashing or signing failure. Details are logged
    /// server-side; the client only ever sees the generic message.
    #[error("Something went wrong!")]
    Internal(#[source] anyhow::Error),
}

impl ApiError {
    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal(err.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(source) = &self {
            tracing::error!(error = ?source, "internal error");
        }

        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth => StatusCode::UNAUTHORIZED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorBody {
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
