use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, RedirectUrl, Scope,
    TokenResponse, TokenUrl,
};
use tower_cookies::Cookies;

use crate::{
    app::AppState,
    auth::{
        flow,
        principal::{AuthOutcome, OAuth2Principal, UserInfo},
        provider::Provider,
        userinfo,
    },
    config::ProviderCfg,
};

/// Query parameters accepted at `/auth/{provider}`.
#[derive(Debug, serde::Deserialize)]
pub struct StartAuthQuery {
    pub redirect_uri: Option<String>,
    pub mode: Option<String>,
}

/// Query parameters the provider sends back to the callback.
#[derive(Debug, serde::Deserialize)]
pub struct AuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Starts the provider round-trip: stashes the frontend's redirect target
/// and mode in flow cookies, then sends the user to the provider (or, for a
/// placeholder provider, straight back to the callback).
pub async fn start(
    state: &AppState,
    cookies: Cookies,
    provider: Provider,
    q: StartAuthQuery,
) -> Response {
    let Some(cfg) = state.config.provider(provider) else {
        tracing::warn!(%provider, "provider not configured");
        return StatusCode::NOT_FOUND.into_response();
    };

    flow::store_flow_cookies(&cookies, q.redirect_uri.as_deref(), q.mode.as_deref());

    if cfg.is_placeholder() {
        return Redirect::temporary(&format!("/auth/callback/{}", provider)).into_response();
    }

    match authorize_redirect(state, &cookies, provider, cfg) {
        Ok(r) => r.into_response(),
        Err(e) => {
            tracing::error!(%provider, error = ?e, "failed to build authorize redirect");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Completes the provider round-trip and hands the outcome to the success
/// dispatcher. Every authentication failure degrades to `Unauthenticated`;
/// the dispatcher turns that into the `Login failed` redirect.
pub async fn callback(
    state: &AppState,
    cookies: Cookies,
    provider: Provider,
    q: AuthCallbackQuery,
) -> Response {
    let outcome = match state.config.provider(provider) {
        None => {
            tracing::warn!(%provider, "provider not configured (callback)");
            AuthOutcome::Unauthenticated
        }
        Some(cfg) if cfg.is_placeholder() => placeholder_outcome(provider),
        Some(cfg) => match live_callback(state, &cookies, provider, cfg, q).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(%provider, error = ?e, "authentication failed");
                AuthOutcome::Unauthenticated
            }
        },
    };

    finish(state, &cookies, outcome).await
}

/// Runs the success dispatcher and translates its result into a response.
pub async fn finish(state: &AppState, cookies: &Cookies, outcome: AuthOutcome) -> Response {
    match state.success.handle(cookies, &outcome, false).await {
        Ok(Some(response)) => response,
        // Upstream already produced a response; nothing left to write.
        Ok(None) => StatusCode::OK.into_response(),
        Err(e) => {
            tracing::error!(error = ?e, "post-login dispatch failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn authorize_redirect(
    state: &AppState,
    cookies: &Cookies,
    provider: Provider,
    cfg: &ProviderCfg,
) -> anyhow::Result<Redirect> {
    let client = oauth_client(state, provider, cfg)?;
    let mut request = client.authorize_url(CsrfToken::new_random);
    for scope in cfg.scopes.split_whitespace() {
        request = request.add_scope(Scope::new(scope.to_string()));
    }
    let (auth_url, csrf_state) = request.url();
    flow::write_state(cookies, &state.cookie_key, provider, csrf_state.secret());
    Ok(Redirect::temporary(auth_url.as_str()))
}

async fn live_callback(
    state: &AppState,
    cookies: &Cookies,
    provider: Provider,
    cfg: &ProviderCfg,
    q: AuthCallbackQuery,
) -> anyhow::Result<AuthOutcome> {
    if let Some(err) = q.error {
        let detail = q.error_description.unwrap_or_default();
        return Err(anyhow::anyhow!("provider error: {} {}", err, detail));
    }
    let code = q.code.ok_or_else(|| anyhow::anyhow!("missing code"))?;
    let state_param = q.state.ok_or_else(|| anyhow::anyhow!("missing state"))?;
    let stored = flow::take_state(cookies, &state.cookie_key, provider)
        .ok_or_else(|| anyhow::anyhow!("missing stored auth state"))?;
    if stored != state_param {
        return Err(anyhow::anyhow!("state mismatch"));
    }

    let client = oauth_client(state, provider, cfg)?;
    let token_resp = client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(async_http_client)
        .await?;
    let access_token = token_resp.access_token().secret().to_string();

    let raw: serde_json::Value = state
        .http
        .get(&cfg.userinfo_url)
        .bearer_auth(&access_token)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let user_info = userinfo::normalize(provider, access_token, &raw)?;
    Ok(AuthOutcome::Authenticated(OAuth2Principal { user_info }))
}

fn oauth_client(
    state: &AppState,
    provider: Provider,
    cfg: &ProviderCfg,
) -> anyhow::Result<BasicClient> {
    let client_id = ClientId::new(
        cfg.client_id
            .clone()
            .ok_or_else(|| anyhow::anyhow!("missing client_id for {}", provider))?,
    );
    let client_secret = ClientSecret::new(
        cfg.client_secret
            .clone()
            .ok_or_else(|| anyhow::anyhow!("missing client_secret for {}", provider))?,
    );
    let auth_url = AuthUrl::new(cfg.auth_url.clone())?;
    let token_url = TokenUrl::new(cfg.token_url.clone())?;
    let redirect_url = RedirectUrl::new(state.callback_url(provider))?;

    Ok(
        BasicClient::new(client_id, Some(client_secret), auth_url, Some(token_url))
            .set_redirect_uri(redirect_url),
    )
}

fn placeholder_outcome(provider: Provider) -> AuthOutcome {
    // Mirrors what a live exchange would produce, with deterministic values.
    AuthOutcome::Authenticated(OAuth2Principal {
        user_info: UserInfo {
            provider,
            subject: format!("{}-placeholder-sub", provider),
            email: Some(format!("{}@example.com", provider)),
            name: Some("Placeholder User".to_string()),
            nickname: Some(format!("{}-user", provider)),
            access_token: format!("{}-placeholder-token", provider),
        },
    })
}
