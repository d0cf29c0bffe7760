//! Public types for the webhook API
use serde::{Deserialize, Serialize};

use crate::core::error::DecodeError;
use crate::google::body::decode_base64;

/// Pub/Sub push request wrapping a Gmail notification.
///
/// Fields are optional so a missing `message` or `data` can be reported
/// with a specific error instead of a generic rejection.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PushEnvelope {
    pub message: Option<PushMessage>,
    pub subscription: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PushMessage {
    /// Base64 encoded JSON, see [`NotificationData`]
    pub data: Option<String>,
    /// Pub/Sub's own id for the push, not the Gmail message id
    #[serde(rename = "messageId")]
    pub pubsub_message_id: Option<String>,
}

/// Decoded contents of `message.data`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NotificationData {
    pub message_id: Option<String>,
}

impl PushEnvelope {
    pub fn data(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|message| message.data.as_deref())
            .filter(|data| !data.is_empty())
    }

    pub fn pubsub_message_id(&self) -> Option<&str> {
        self.message
            .as_ref()
            .and_then(|message| message.pubsub_message_id.as_deref())
    }
}

/// Decode `message.data` into the notification it carries.
pub fn decode_notification(data: &str) -> Result<NotificationData, DecodeError> {
    let decoded = decode_base64(data)?;
    tracing::debug!("Decoded message: {}", decoded);
    Ok(serde_json::from_str(&decoded)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use base64::engine::general_purpose::{STANDARD, URL_SAFE};

    #[test]
    fn test_decode_notification() {
        let data = URL_SAFE.encode(r#"{"message_id": "m1"}"#);
        let notification = decode_notification(&data).unwrap();
        assert_eq!(notification.message_id.as_deref(), Some("m1"));

        // Decoding the same envelope twice gives the same id
        assert_eq!(decode_notification(&data).unwrap(), notification);
    }

    #[test]
    fn test_decode_notification_standard_alphabet() {
        let data = STANDARD.encode(r#"{"message_id": "id>>?"}"#);
        assert!(data.contains('+') || data.contains('/'));
        let notification = decode_notification(&data).unwrap();
        assert_eq!(notification.message_id.as_deref(), Some("id>>?"));
    }

    #[test]
    fn test_decode_notification_without_message_id() {
        let data = URL_SAFE.encode(r#"{"emailAddress": "me@example.com", "historyId": 1}"#);
        let notification = decode_notification(&data).unwrap();
        assert!(notification.message_id.is_none());
    }

    #[test]
    fn test_decode_notification_errors() {
        assert!(matches!(
            decode_notification("***"),
            Err(DecodeError::Base64(_))
        ));
        let data = URL_SAFE.encode("not json");
        assert!(matches!(
            decode_notification(&data),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_envelope_data() {
        let envelope: PushEnvelope = serde_json::from_str(
            r#"{"message": {"data": "abc", "messageId": "123"}, "subscription": "projects/p/subscriptions/s"}"#,
        )
        .unwrap();
        assert_eq!(envelope.data(), Some("abc"));
        assert_eq!(envelope.pubsub_message_id(), Some("123"));
        assert_eq!(envelope.subscription.as_deref(), Some("projects/p/subscriptions/s"));

        let envelope: PushEnvelope = serde_json::from_str(r#"{"message": {"data": ""}}"#).unwrap();
        assert!(envelope.data().is_none());

        let envelope: PushEnvelope = serde_json::from_str("{}").unwrap();
        assert!(envelope.data().is_none());
        assert!(envelope.pubsub_message_id().is_none());
    }
}
