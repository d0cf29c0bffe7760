use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_REDIRECT_URI: &str = "http://localhost:5000/oauth2callback";
const DEFAULT_GMAIL_API_URL: &str = "https://gmail.googleapis.com";
const DEFAULT_GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const DEFAULT_GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Read and modify access to the mailbox.
pub const GMAIL_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/gmail.modify",
];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: String,
    pub gmail_account: String,
    pub gmail_api_client_id: String,
    pub gmail_api_client_secret: String,
    pub gmail_redirect_uri: String,
    pub gmail_topic: Option<String>,
    pub gmail_label_ids: Vec<String>,
    pub gmail_api_url: String,
    pub google_auth_url: String,
    pub google_token_url: String,
    pub slack_webhook_url: String,
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Build the config from `RELAY_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let storage_path = env::var("RELAY_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = format!("{}/relay.db", storage_path.trim_end_matches('/'));
        let gmail_account = env::var("RELAY_GMAIL_ACCOUNT").unwrap_or("me".to_string());
        let gmail_api_client_id =
            env::var("RELAY_GMAIL_CLIENT_ID").context("Missing env var RELAY_GMAIL_CLIENT_ID")?;
        let gmail_api_client_secret = env::var("RELAY_GMAIL_CLIENT_SECRET")
            .context("Missing env var RELAY_GMAIL_CLIENT_SECRET")?;
        let gmail_redirect_uri =
            env::var("RELAY_GMAIL_REDIRECT_URI").unwrap_or(DEFAULT_REDIRECT_URI.to_string());
        let gmail_topic = env::var("RELAY_GMAIL_TOPIC")
            .ok()
            .filter(|topic| !topic.trim().is_empty());
        let gmail_label_ids = parse_label_ids(
            &env::var("RELAY_GMAIL_LABELS").unwrap_or_else(|_| "INBOX".to_string()),
        );
        let gmail_api_url =
            env::var("RELAY_GMAIL_API_URL").unwrap_or(DEFAULT_GMAIL_API_URL.to_string());
        let google_auth_url =
            env::var("RELAY_GOOGLE_AUTH_URL").unwrap_or(DEFAULT_GOOGLE_AUTH_URL.to_string());
        let google_token_url =
            env::var("RELAY_GOOGLE_TOKEN_URL").unwrap_or(DEFAULT_GOOGLE_TOKEN_URL.to_string());
        let slack_webhook_url = env::var("RELAY_SLACK_WEBHOOK_URL")
            .context("Missing env var RELAY_SLACK_WEBHOOK_URL")?;
        let http_timeout = match env::var("RELAY_HTTP_TIMEOUT_SECS") {
            Ok(secs) => Duration::from_secs(
                secs.parse()
                    .context("RELAY_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            Err(_) => Duration::from_secs(10),
        };

        Ok(Self {
            db_path,
            gmail_account,
            gmail_api_client_id,
            gmail_api_client_secret,
            gmail_redirect_uri,
            gmail_topic,
            gmail_label_ids,
            gmail_api_url,
            google_auth_url,
            google_token_url,
            slack_webhook_url,
            http_timeout,
        })
    }

    /// Shared outbound HTTP client with the configured timeout applied.
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let client = reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()?;
        Ok(client)
    }
}

#[cfg(test)]
impl AppConfig {
    /// Config with every outbound endpoint pointed at `base_url`.
    pub fn for_tests(base_url: &str) -> Self {
        Self {
            db_path: String::from("./relay.db"),
            gmail_account: String::from("me"),
            gmail_api_client_id: String::from("client id"),
            gmail_api_client_secret: String::from("test_client_secret"),
            gmail_redirect_uri: String::from("http://localhost:5000/oauth2callback"),
            gmail_topic: Some(String::from("projects/test/topics/mail")),
            gmail_label_ids: vec![String::from("INBOX")],
            gmail_api_url: base_url.to_string(),
            google_auth_url: format!("{}/auth", base_url),
            google_token_url: format!("{}/token", base_url),
            slack_webhook_url: format!("{}/slack", base_url),
            http_timeout: Duration::from_secs(5),
        }
    }
}

fn parse_label_ids(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(String::from)
        .collect()
}
