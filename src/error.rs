use std::any::Any;

use axum::{
    http::StatusCode,
    BoxError,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Errors surfaced to HTTP clients. Internal causes are logged where they
/// happen and never leave the process.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("missing id")]
    MissingId,
    #[error("not found")]
    NotFound,
    #[error("request timed out")]
    Timeout,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingId => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingId => "missing_id",
            ApiError::NotFound => "not_found",
            ApiError::Timeout => "timeout",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.code().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

/// Error handler for the request deadline middleware.
pub async fn handle_middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("request deadline exceeded");
        ApiError::Timeout
    } else {
        tracing::error!(error = %err, "middleware failed");
        ApiError::Internal(anyhow::Error::msg(err.to_string()))
    }
}

/// Response for a handler that panicked; used by `CatchPanicLayer`.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic"
    };
    tracing::error!(panic = %detail, "handler panicked");
    ApiError::Internal(anyhow::anyhow!("handler panicked")).into_response()
}
