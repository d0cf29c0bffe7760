//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{Router, body::Body};
use chrono::{DateTime, Utc};
use tempfile::TempDir;

use mailrelay::api::AppState;
use mailrelay::api::app;
use mailrelay::core::AppConfig;
use mailrelay::core::db::async_db;
use mailrelay::google::credentials::Credential;

pub struct TestApp {
    pub app: Router,
    pub state: Arc<AppState>,
    // Keeps the database directory alive for the duration of the test
    _dir: TempDir,
}

/// Config with every outbound endpoint pointed at `base_url`, usually a
/// `mockito` server.
pub fn test_config(base_url: &str, db_path: &str) -> AppConfig {
    AppConfig {
        db_path: db_path.to_string(),
        gmail_account: String::from("test@example.com"),
        gmail_api_client_id: String::from("test_client_id"),
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

/// Creates a test application backed by a fresh sqlite file in a
/// temporary directory.
pub async fn test_app(base_url: &str) -> TestApp {
    test_app_with(base_url, |_| {}).await
}

/// Same as [`test_app`] but lets the caller adjust the config first.
pub async fn test_app_with(base_url: &str, customize: impl FnOnce(&mut AppConfig)) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("relay.db");
    let db_path = db_path.to_str().unwrap();

    let db = async_db(db_path)
        .await
        .expect("Failed to connect to async db");

    let mut config = test_config(base_url, db_path);
    customize(&mut config);

    let state = Arc::new(AppState::new(db, config).expect("Failed to build app state"));
    TestApp {
        app: app(Arc::clone(&state)),
        state,
        _dir: dir,
    }
}

/// Store a credential so handlers don't need to go through consent.
pub async fn seed_credential(state: &AppState, access_token: &str, expiry: Option<DateTime<Utc>>) {
    state
        .credentials
        .save(&Credential {
            access_token: access_token.to_string(),
            refresh_token: Some(String::from("refresh-1")),
            expiry,
            scopes: vec![String::from("https://www.googleapis.com/auth/gmail.modify")],
        })
        .await
        .expect("Failed to seed credential");
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Failed to read body");
    String::from_utf8(bytes.to_vec()).expect("Body is not UTF-8")
}

pub async fn body_to_json(body: Body) -> serde_json::Value {
    serde_json::from_str(&body_to_string(body).await).expect("Body is not JSON")
}
