//! Public API types

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

/// Response body shared by every endpoint:
/// `{"status": "success" | "error", "message": "..."}`
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub message: String,
}

impl StatusResponse {
    pub fn success(message: &str) -> Self {
        Self {
            status: String::from("success"),
            message: message.to_string(),
        }
    }

    pub fn error(message: &str) -> Self {
        Self {
            status: String::from("error"),
            message: message.to_string(),
        }
    }
}

// Errors

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Malformed input from the caller
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Provider or downstream failure
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{} {}", self.status, self.message);

        (self.status, Json(StatusResponse::error(&self.message))).into_response()
    }
}

/// Enables using `?` on anything convertible to `anyhow::Error`. Those
/// are treated as server errors.
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::internal(err.into().to_string())
    }
}

// Re-export public types from each route

pub mod oauth {
    pub use crate::api::routes::oauth::public::*;
}

pub mod webhook {
    pub use crate::api::routes::webhook::public::*;
}
