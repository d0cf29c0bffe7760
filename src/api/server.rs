use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::api::state::AppState;
use crate::core::{AppConfig, db::async_db};
use crate::jobs::{RenewGmailWatch, spawn_periodic_job};

pub fn app(shared_state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    let db = async_db(&config.db_path)
        .await
        .with_context(|| format!("Failed to open credential db at {}", config.db_path))?;

    let shared_state = Arc::new(AppState::new(db, config)?);
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    // Watch registration runs off the request path
    spawn_periodic_job(Arc::clone(&shared_state), RenewGmailWatch);

    axum::serve(listener, app).await?;
    Ok(())
}
