use anyhow::Result;
use tokio_rusqlite::Connection;

use crate::core::AppConfig;
use crate::google::credentials::CredentialStore;
use crate::google::gmail::GmailClient;
use crate::google::oauth::OAuthClient;
use crate::notify::SlackNotifier;

/// Everything a request handler needs. All members are cheap to clone
/// and safe to share across concurrent handlers.
pub struct AppState {
    pub config: AppConfig,
    pub credentials: CredentialStore,
    pub gmail: GmailClient,
    pub notifier: SlackNotifier,
}

impl AppState {
    pub fn new(db: Connection, config: AppConfig) -> Result<Self> {
        // Shared by every outbound call
        let http = config.http_client()?;
        let oauth = OAuthClient::new(http.clone(), &config);
        let credentials = CredentialStore::new(db, oauth, &config.gmail_account);
        let gmail = GmailClient::new(http.clone(), &config.gmail_api_url);
        let notifier = SlackNotifier::new(http, &config.slack_webhook_url);

        Ok(Self {
            config,
            credentials,
            gmail,
            notifier,
        })
    }
}
