//! API routes module

pub mod oauth;
pub mod webhook;

use std::sync::Arc;

use crate::api::state::AppState;
use axum::Router;

type SharedState = Arc<AppState>;

async fn index() -> &'static str {
    "mailrelay is running!"
}

/// Create the combined API router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", axum::routing::get(index))
        // Gmail push notifications
        .merge(webhook::router())
        // OAuth consent flow
        .merge(oauth::router())
}
