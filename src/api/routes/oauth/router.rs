//! Router for the OAuth consent flow

use std::sync::Arc;

use axum::response::Redirect;
use axum::{Json, Router, extract::State};
use axum_extra::extract::Query;

use super::public::OAuthCallbackQuery;
use crate::api::public::{ApiError, StatusResponse};
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

/// Send the operator to Google's consent screen
async fn authorize(State(state): State<SharedState>) -> Redirect {
    Redirect::to(&state.credentials.authorization_url())
}

/// Exchange the authorization code Google redirects back with and
/// persist the resulting credential.
async fn oauth2_callback(
    State(state): State<SharedState>,
    Query(params): Query<OAuthCallbackQuery>,
) -> Result<Json<StatusResponse>, ApiError> {
    if let Some(error) = params.error {
        tracing::warn!("Consent flow returned an error: {}", error);
    }

    let Some(code) = params.code.filter(|code| !code.is_empty()) else {
        return Err(ApiError::bad_request("Authorization code not found"));
    };

    state.credentials.complete_authorization(&code).await?;

    Ok(Json(StatusResponse::success("Authorization successful!")))
}

/// Create the OAuth router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/authorize", axum::routing::get(authorize))
        .route("/oauth2callback", axum::routing::get(oauth2_callback))
        .route("/oauth2callback/", axum::routing::get(oauth2_callback))
}
