use axum::{routing::get, Router};
use std::sync::Arc;
use tower_cookies::{CookieManagerLayer, Key};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::auth::provider::Provider;
use crate::auth::success::SuccessHandler;
use crate::auth::unlink::{HttpProviderUnlinker, ProviderUnlinker};
use crate::config::{decode_cookie_key, AppConfig};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub cookie_key: Key,
    pub http: reqwest::Client,
    pub success: Arc<SuccessHandler>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        cookie_key: Key,
        http: reqwest::Client,
        unlinker: Arc<dyn ProviderUnlinker>,
    ) -> Self {
        let success = Arc::new(SuccessHandler::new(
            config.auth.default_redirect_url.clone(),
            unlinker,
        ));
        Self {
            config,
            cookie_key,
            http,
            success,
        }
    }

    /// Absolute callback URL registered with the provider.
    pub fn callback_url(&self, provider: Provider) -> String {
        format!(
            "{}/auth/callback/{}",
            self.config.server.public_url.trim_end_matches('/'),
            provider
        )
    }
}

pub async fn run() -> anyhow::Result<()> {
    // logging
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();

    let config = AppConfig::load()?;
    let key_bytes = decode_cookie_key(&config.server.cookie_key_base64)?;
    let cookie_key = Key::from(&key_bytes);

    let http = reqwest::Client::new();
    let unlinker: Arc<dyn ProviderUnlinker> =
        Arc::new(HttpProviderUnlinker::new(http.clone(), &config));
    let state = AppState::new(config, cookie_key, http, unlinker);

    let addr = state.config.server.bind_addr.clone();
    let app = build_router(state);

    tracing::info!(%addr, "listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/auth/{provider}", get(crate::web::handlers::auth::start))
        .route(
            "/auth/callback/{provider}",
            get(crate::web::handlers::auth::callback),
        )
        .with_state(state)
        .layer(CookieManagerLayer::new())
        .layer(TraceLayer::new_for_http())
}
