//! Public types for the OAuth API
use serde::Deserialize;

/// Query string Google appends to the redirect URI
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub error: Option<String>,
}
