//! Google OAuth2 consent URL and token grants

use reqwest::Client;
use serde::Deserialize;

use crate::core::AppConfig;
use crate::core::config::GMAIL_SCOPES;
use crate::core::error::AuthError;

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Option<i64>,
    pub scope: Option<String>,
}

#[derive(Clone, Debug)]
pub struct OAuthClient {
    http: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
}

impl OAuthClient {
    pub fn new(http: Client, config: &AppConfig) -> Self {
        Self {
            http,
            client_id: config.gmail_api_client_id.clone(),
            client_secret: config.gmail_api_client_secret.clone(),
            redirect_uri: config.gmail_redirect_uri.clone(),
            auth_url: config.google_auth_url.clone(),
            token_url: config.google_token_url.clone(),
        }
    }

    /// Consent URL for offline access to the mailbox. `prompt=consent`
    /// makes Google hand out a refresh token every time.
    pub fn authorization_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&GMAIL_SCOPES.join(" "))
        )
    }

    pub async fn exchange_code_for_token(&self, code: &str) -> Result<TokenResponse, AuthError> {
        self.token_request(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ])
        .await
    }

    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, AuthError> {
        self.token_request(&[
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let res = self.http.post(&self.token_url).form(form).send().await?;
        let status = res.status();
        let text = res.text().await.unwrap_or_default();
        if !status.is_success() {
            tracing::error!("Token endpoint responded {}: {}", status, text);
            return Err(AuthError::Exchange { status, body: text });
        }
        let token: TokenResponse = serde_json::from_str(&text)?;
        Ok(token)
    }
}
