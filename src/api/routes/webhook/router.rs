//! Router for the webhook API

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::{Json, Router, extract::State};

use super::public::{PushEnvelope, decode_notification};
use crate::api::public::{ApiError, StatusResponse};
use crate::api::state::AppState;
use crate::google::body::extract_body;

type SharedState = Arc<AppState>;

/// Handle a Gmail push notification delivered by Pub/Sub.
///
/// Runs receive, decode, fetch, extract and deliver exactly once. A
/// non-2xx response makes Pub/Sub redeliver, which is the only retry.
async fn gmail_webhook(
    State(state): State<SharedState>,
    payload: Result<Json<PushEnvelope>, JsonRejection>,
) -> Result<Json<StatusResponse>, ApiError> {
    let Json(envelope) =
        payload.map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e.body_text())))?;
    tracing::debug!("Received data: {:?}", envelope);
    tracing::info!(
        "Push {} from subscription {}",
        envelope.pubsub_message_id().unwrap_or("-"),
        envelope.subscription.as_deref().unwrap_or("-")
    );

    let Some(data) = envelope.data() else {
        return Err(ApiError::bad_request("No message data found."));
    };

    let notification = decode_notification(data)
        .map_err(|e| ApiError::bad_request(format!("Invalid message data: {}", e)))?;
    let Some(message_id) = notification.message_id.filter(|id| !id.is_empty()) else {
        return Err(ApiError::bad_request("Message ID not found."));
    };

    let credential = state.credentials.ensure_valid().await?;
    let message = state
        .gmail
        .fetch_message(&credential.access_token, &message_id)
        .await?;
    tracing::debug!("Gmail message: {:?}", message);

    let email_body = extract_body(&message)?;
    tracing::debug!("Email body: {}", email_body);

    if let Err(e) = state.notifier.deliver(&email_body).await {
        tracing::error!("Failed to send email body to Slack: {}", e);
        return Err(ApiError::internal("Failed to send to Slack."));
    }

    tracing::info!("Email body for {} sent to Slack successfully.", message_id);
    Ok(Json(StatusResponse::success("Email body sent to Slack!")))
}

/// Create the webhook router
pub fn router() -> Router<SharedState> {
    Router::new().route("/webhook", axum::routing::post(gmail_webhook))
}
