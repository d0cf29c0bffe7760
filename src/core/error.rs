//! Error types for each stage of the relay pipeline

use reqwest::StatusCode;
use thiserror::Error;

/// Token exchange, refresh, or credential storage failure.
#[derive(Debug, Error)]
pub enum AuthError {
    /// No usable credential is stored. Someone has to visit `auth_url`
    /// and complete the consent flow.
    #[error("Authorization required. Visit {auth_url} to grant access")]
    AuthorizationRequired { auth_url: String },
    #[error("Token exchange failed: {status} ({body})")]
    Exchange { status: StatusCode, body: String },
    #[error("Token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed token response: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Credential storage failed: {0}")]
    Storage(#[from] tokio_rusqlite::Error),
}

/// Message retrieval failure.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Message fetch failed: {status} ({body})")]
    Status { status: StatusCode, body: String },
    #[error("Message request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed message payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Malformed base64, UTF-8, or JSON in a notification or message body.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Push subscription setup failure. Logged, never fatal.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Gmail watch setup failed: {status} ({body})")]
    Status { status: StatusCode, body: String },
    #[error("Watch request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed watch response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Downstream chat webhook rejected the message or was unreachable.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Slack webhook responded {status} ({body})")]
    Status { status: StatusCode, body: String },
    #[error("Slack request failed: {0}")]
    Http(#[from] reqwest::Error),
}
