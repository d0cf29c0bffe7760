pub mod models;
pub use models::*;

use reqwest::Client;

use crate::core::error::DeliveryError;

/// Posts extracted mail bodies to a single Slack incoming webhook.
///
/// One attempt per call; failures are not retried.
#[derive(Clone, Debug)]
pub struct SlackNotifier {
    http: Client,
    webhook_url: String,
}

impl SlackNotifier {
    pub fn new(http: Client, webhook_url: &str) -> Self {
        Self {
            http,
            webhook_url: webhook_url.to_string(),
        }
    }

    pub async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let payload = SlackPayload::new(text);
        let res = self
            .http
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await.unwrap_or_default();
        tracing::debug!("Slack response: {} - {}", status, body);

        if !status.is_success() {
            return Err(DeliveryError::Status { status, body });
        }
        Ok(())
    }
}
