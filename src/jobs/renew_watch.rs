use async_trait::async_trait;
use std::time::Duration;

use super::PeriodicJob;
use crate::api::AppState;
use crate::core::error::WatchError;
use crate::google::gmail::WatchResponse;

/// Keeps the Gmail push subscription alive. Gmail drops a watch after
/// seven days without renewal.
#[derive(Debug)]
pub struct RenewGmailWatch;

#[async_trait]
impl PeriodicJob for RenewGmailWatch {
    fn interval(&self) -> Duration {
        // Run once daily
        Duration::from_secs(60 * 60 * 24)
    }

    async fn run_job(&self, state: &AppState) {
        match renew_gmail_watch(state).await {
            Ok(Some(watch)) => tracing::info!(
                "Gmail watch registered: history_id={} expiration={}",
                watch.history_id,
                watch.expiration
            ),
            Ok(None) => {}
            Err(e) => tracing::error!("An error occurred while setting up Gmail watch: {}", e),
        }
    }
}

/// Register the watch for the configured labels and topic. Returns
/// `None` when no topic is configured.
pub async fn renew_gmail_watch(state: &AppState) -> Result<Option<WatchResponse>, WatchError> {
    let Some(topic) = &state.config.gmail_topic else {
        tracing::warn!("RELAY_GMAIL_TOPIC not configured, skipping Gmail watch");
        return Ok(None);
    };

    let credential = state.credentials.ensure_valid().await?;
    let watch = state
        .gmail
        .register_watch(
            &credential.access_token,
            &state.config.gmail_label_ids,
            topic,
        )
        .await?;

    Ok(Some(watch))
}
