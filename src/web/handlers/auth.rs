use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_cookies::Cookies;

use crate::app::AppState;
use crate::auth::oauth::{self, AuthCallbackQuery, StartAuthQuery};
use crate::auth::principal::AuthOutcome;
use crate::auth::provider::Provider;

// Starts the OAuth flow for a given provider.
pub async fn start(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(provider): Path<String>,
    Query(q): Query<StartAuthQuery>,
) -> Response {
    let Some(provider) = Provider::parse(&provider) else {
        tracing::warn!(%provider, "unknown provider in auth start");
        return StatusCode::NOT_FOUND.into_response();
    };
    oauth::start(&state, cookies, provider, q).await
}

// Handles the redirect back from the provider.
pub async fn callback(
    State(state): State<AppState>,
    cookies: Cookies,
    Path(provider): Path<String>,
    Query(q): Query<AuthCallbackQuery>,
) -> Response {
    let Some(provider) = Provider::parse(&provider) else {
        tracing::warn!(%provider, "unknown provider in auth callback");
        return oauth::finish(&state, &cookies, AuthOutcome::Unauthenticated).await;
    };
    oauth::callback(&state, cookies, provider, q).await
}
