use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use tower_cookies::Key;

use loginrelay::app::{build_router, AppState};
use loginrelay::auth::provider::Provider;
use loginrelay::auth::unlink::ProviderUnlinker;
use loginrelay::config::{AppConfig, AuthCfg, ProviderCfg, ServerCfg};

/// Unlinker double that records every call instead of hitting the network.
#[derive(Default)]
pub struct RecordingUnlinker {
    pub calls: Mutex<Vec<(Provider, String)>>,
}

#[async_trait]
impl ProviderUnlinker for RecordingUnlinker {
    async fn unlink(&self, provider: Provider, access_token: &str) -> anyhow::Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push((provider, access_token.to_string()));
        Ok(())
    }
}

pub const DEFAULT_REDIRECT_URL: &str = "http://localhost:3000/oauth/redirect";

/// google stays live (pointing at example.com) so authorize-redirect
/// behavior is observable; naver and kakao run in placeholder mode so full
/// flows complete without network access.
pub fn test_config() -> AppConfig {
    let mut providers = HashMap::new();
    providers.insert(
        "google".to_string(),
        ProviderCfg {
            client_id: Some("CLIENT".to_string()),
            client_secret: Some("SECRET".to_string()),
            auth_url: "https://example.com/authorize".to_string(),
            token_url: "https://example.com/token".to_string(),
            userinfo_url: "https://example.com/userinfo".to_string(),
            scopes: "openid email profile".to_string(),
            mode: "live".to_string(),
        },
    );
    for key in ["naver", "kakao"] {
        providers.insert(key.to_string(), placeholder_provider());
    }

    AppConfig {
        server: ServerCfg {
            bind_addr: "127.0.0.1:0".to_string(),
            public_url: "http://localhost:8080".to_string(),
            cookie_key_base64: String::new(),
        },
        auth: AuthCfg {
            default_redirect_url: DEFAULT_REDIRECT_URL.to_string(),
            providers,
        },
    }
}

fn placeholder_provider() -> ProviderCfg {
    ProviderCfg {
        client_id: None,
        client_secret: None,
        auth_url: "https://example.com/authorize".to_string(),
        token_url: "https://example.com/token".to_string(),
        userinfo_url: "https://example.com/userinfo".to_string(),
        scopes: String::new(),
        mode: "placeholder".to_string(),
    }
}

pub fn build_test_state(unlinker: Arc<dyn ProviderUnlinker>) -> AppState {
    AppState::new(
        test_config(),
        Key::from(&[0u8; 64]),
        reqwest::Client::new(),
        unlinker,
    )
}

pub fn build_test_app(state: AppState) -> Router {
    build_router(state)
}
