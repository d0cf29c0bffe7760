//! Persisted OAuth credential for the relay's single mailbox.
//!
//! The credential lives in the `auth` table keyed by the configured
//! mailbox account. Every successful token exchange overwrites the row.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;
use tokio_rusqlite::Connection;

use super::oauth::{OAuthClient, TokenResponse};
use crate::core::error::AuthError;

const SERVICE: &str = "gmail";

// Treat tokens as expired a little early so a request doesn't start
// with a token that lapses mid-flight.
const EXPIRY_LEEWAY_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expiry: Option<DateTime<Utc>>,
    pub scopes: Vec<String>,
}

impl Credential {
    /// Build a credential from a token response. A refresh grant usually
    /// omits the refresh token so the previous one is carried over.
    pub fn from_token_response(token: TokenResponse, previous_refresh_token: Option<String>) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token.or(previous_refresh_token),
            expiry: token
                .expires_in
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            scopes: token
                .scope
                .map(|scope| scope.split_whitespace().map(String::from).collect())
                .unwrap_or_default(),
        }
    }

    pub fn is_expired(&self) -> bool {
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_LEEWAY_SECS) <= Utc::now(),
            None => false,
        }
    }
}

#[derive(Clone)]
pub struct CredentialStore {
    db: Connection,
    oauth: OAuthClient,
    account: String,
    // Serializes check-refresh-persist so concurrent handlers refresh once
    refresh_lock: Arc<Mutex<()>>,
}

impl CredentialStore {
    pub fn new(db: Connection, oauth: OAuthClient, account: &str) -> Self {
        Self {
            db,
            oauth,
            account: account.to_string(),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn authorization_url(&self) -> String {
        self.oauth.authorization_url()
    }

    pub async fn load(&self) -> Result<Option<Credential>, AuthError> {
        let account = self.account.clone();
        let credential = self
            .db
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT access_token, refresh_token, expires_at, scopes FROM auth WHERE id = ?1",
                )?;
                let mut rows = stmt.query([&account])?;
                let Some(row) = rows.next()? else {
                    return Ok(None);
                };
                let expires_at: Option<i64> = row.get(2)?;
                let scopes: String = row.get(3)?;
                Ok(Some(Credential {
                    access_token: row.get(0)?,
                    refresh_token: row.get(1)?,
                    expiry: expires_at.and_then(|ts| Utc.timestamp_opt(ts, 0).single()),
                    scopes: scopes.split_whitespace().map(String::from).collect(),
                }))
            })
            .await?;
        Ok(credential)
    }

    pub async fn save(&self, credential: &Credential) -> Result<(), AuthError> {
        let account = self.account.clone();
        let credential = credential.clone();
        self.db
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO auth (id, service, access_token, refresh_token, expires_at, scopes)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(id) DO UPDATE SET
                         service = excluded.service,
                         access_token = excluded.access_token,
                         refresh_token = excluded.refresh_token,
                         expires_at = excluded.expires_at,
                         scopes = excluded.scopes",
                    rusqlite::params![
                        account,
                        SERVICE,
                        credential.access_token,
                        credential.refresh_token,
                        credential.expiry.map(|expiry| expiry.timestamp()),
                        credential.scopes.join(" "),
                    ],
                )?;
                Ok(())
            })
            .await?;
        Ok(())
    }

    /// Return a credential that can be used right now, refreshing and
    /// persisting it first if it has expired.
    pub async fn ensure_valid(&self) -> Result<Credential, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        let Some(credential) = self.load().await? else {
            return Err(self.authorization_required());
        };

        if !credential.is_expired() {
            return Ok(credential);
        }

        let Some(refresh_token) = credential.refresh_token.clone() else {
            tracing::warn!("Stored credential expired and has no refresh token");
            return Err(self.authorization_required());
        };

        let token = self.oauth.refresh_access_token(&refresh_token).await?;
        let refreshed = Credential::from_token_response(token, Some(refresh_token));
        self.save(&refreshed).await?;
        tracing::info!("Credentials refreshed for {}", self.account);

        Ok(refreshed)
    }

    /// Exchange an authorization code from the consent flow and store
    /// the resulting credential.
    pub async fn complete_authorization(&self, code: &str) -> Result<Credential, AuthError> {
        let _guard = self.refresh_lock.lock().await;

        let previous = self.load().await?.and_then(|c| c.refresh_token);
        let token = self.oauth.exchange_code_for_token(code).await?;
        let credential = Credential::from_token_response(token, previous);
        self.save(&credential).await?;
        tracing::info!("Authorization successful for {}", self.account);

        Ok(credential)
    }

    fn authorization_required(&self) -> AuthError {
        let auth_url = self.authorization_url();
        tracing::error!("Please go to this URL and authorize access:\n{}", auth_url);
        AuthError::AuthorizationRequired { auth_url }
    }
}
