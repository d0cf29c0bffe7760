use serde::Serialize;

/// Body of a Slack incoming webhook request. Slack renders `text` as
/// the message content.
#[derive(Debug, Serialize, Clone)]
pub struct SlackPayload {
    pub text: String,
}

impl SlackPayload {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}
