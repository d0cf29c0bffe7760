//! Gmail API client for fetching a single message and registering the
//! Pub/Sub watch that drives the relay

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::core::error::{FetchError, WatchError};

/// Message structures from Gmail API documentation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(rename = "threadId")]
    pub thread_id: Option<String>,
    pub snippet: Option<String>,
    pub payload: Option<MessagePart>,
    #[serde(rename = "labelIds")]
    pub label_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePartBody {
    #[serde(rename = "attachmentId")]
    pub attachment_id: Option<String>,
    #[serde(default)]
    pub size: u64,
    // Base64url encoded
    pub data: Option<String>,
}

/// A node in the message's part tree. The top-level payload is itself
/// a part; multipart messages nest children under `parts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagePart {
    #[serde(rename = "partId")]
    pub part_id: Option<String>,
    #[serde(rename = "mimeType", default)]
    pub mimetype: String,
    pub filename: Option<String>,
    pub headers: Option<Vec<MessageHeader>>,
    pub body: Option<MessagePartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

impl MessagePart {
    /// Inline body data if present and non-empty
    pub fn data(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|body| body.data.as_deref())
            .filter(|data| !data.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageHeader {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WatchRequest<'a> {
    label_ids: &'a [String],
    topic_name: &'a str,
}

/// Response from Gmail watch setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchResponse {
    pub history_id: String,
    /// Watch expiration timestamp (milliseconds since epoch)
    pub expiration: String,
}

#[derive(Clone, Debug)]
pub struct GmailClient {
    http: Client,
    api_url: String,
}

impl GmailClient {
    pub fn new(http: Client, api_url: &str) -> Self {
        Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch the full representation of a single message
    pub async fn fetch_message(
        &self,
        access_token: &str,
        message_id: &str,
    ) -> Result<Message, FetchError> {
        let url = format!(
            "{}/gmail/v1/users/me/messages/{}?format=full",
            self.api_url,
            urlencoding::encode(message_id)
        );
        let res = self.http.get(&url).bearer_auth(access_token).send().await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::error!("Message fetch for {} failed: {} ({})", message_id, status, text);
            return Err(FetchError::Status { status, body: text });
        }
        let message: Message = serde_json::from_str(&text).inspect_err(|e| {
            tracing::error!("Malformed message payload for {}: {} ({})", message_id, e, text)
        })?;
        Ok(message)
    }

    /// Register (or renew) the mailbox push subscription. Gmail expires
    /// a watch after seven days so this needs calling periodically.
    pub async fn register_watch(
        &self,
        access_token: &str,
        label_ids: &[String],
        topic_name: &str,
    ) -> Result<WatchResponse, WatchError> {
        let url = format!("{}/gmail/v1/users/me/watch", self.api_url);
        let request = WatchRequest {
            label_ids,
            topic_name,
        };
        let res = self
            .http
            .post(&url)
            .bearer_auth(access_token)
            .json(&request)
            .send()
            .await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(WatchError::Status { status, body: text });
        }
        let watch: WatchResponse = serde_json::from_str(&text)?;
        Ok(watch)
    }
}
