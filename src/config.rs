use base64::Engine as _;
use rand::RngCore;
use serde::Deserialize;
use std::collections::HashMap;

use crate::auth::provider::Provider;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerCfg {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Externally visible base URL, used to build provider redirect URLs
    #[serde(default = "default_public_url")]
    pub public_url: String,
    /// Base64-encoded key used to encrypt the short-lived auth-state cookie
    #[serde(default)]
    pub cookie_key_base64: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthCfg {
    /// Where to send the user when no redirect_uri cookie is present
    #[serde(default = "default_redirect_url")]
    pub default_redirect_url: String,
    #[serde(default)]
    pub providers: HashMap<String, ProviderCfg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCfg {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    /// Space-separated scope list requested at the authorize endpoint
    #[serde(default)]
    pub scopes: String,
    /// "live" drives the real provider round-trip; "placeholder" fabricates
    /// a deterministic principal without leaving the service
    #[serde(default = "default_provider_mode")]
    pub mode: String,
}

impl ProviderCfg {
    pub fn is_placeholder(&self) -> bool {
        self.mode.eq_ignore_ascii_case("placeholder")
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerCfg,
    pub auth: AuthCfg,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}
fn default_public_url() -> String {
    "http://127.0.0.1:8080".to_string()
}
fn default_redirect_url() -> String {
    "http://localhost:3000/oauth/redirect".to_string()
}
fn default_provider_mode() -> String {
    "live".to_string()
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let settings = config::Config::builder()
            .add_source(config::Environment::default().separator("_"))
            .build()?;

        // Map flat env names to the nested structure for convenience
        // APP_BIND_ADDR, APP_PUBLIC_URL, COOKIE_KEY_BASE64, AUTH_DEFAULT_REDIRECT_URL
        let mut server = settings.get::<ServerCfg>("server").unwrap_or(ServerCfg {
            bind_addr: std::env::var("APP_BIND_ADDR").unwrap_or_else(|_| default_bind_addr()),
            public_url: std::env::var("APP_PUBLIC_URL").unwrap_or_else(|_| default_public_url()),
            cookie_key_base64: std::env::var("COOKIE_KEY_BASE64").unwrap_or_default(),
        });
        if server.cookie_key_base64.is_empty() {
            // Generate a dev key and keep it in-memory only
            let mut key = [0u8; 64];
            rand::rngs::OsRng.fill_bytes(&mut key);
            server.cookie_key_base64 = base64::engine::general_purpose::STANDARD.encode(key);
            tracing::warn!(
                "COOKIE_KEY_BASE64 not provided; generated a temporary dev key. Logins in flight will not survive a restart."
            );
        }

        let mut auth = settings.get::<AuthCfg>("auth").unwrap_or_else(|_| AuthCfg {
            default_redirect_url: std::env::var("AUTH_DEFAULT_REDIRECT_URL")
                .unwrap_or_else(|_| default_redirect_url()),
            providers: HashMap::new(),
        });

        // Known provider endpoints ship as defaults; credentials and mode
        // come from flat env vars (GOOGLE_CLIENT_ID, KAKAO_AUTH_MODE, ...)
        for (key, mut cfg) in builtin_providers() {
            apply_env_overrides(&key, &mut cfg);
            auth.providers.entry(key).or_insert(cfg);
        }

        Ok(AppConfig { server, auth })
    }

    pub fn provider(&self, provider: Provider) -> Option<&ProviderCfg> {
        self.auth.providers.get(provider.as_str())
    }
}

fn builtin_providers() -> Vec<(String, ProviderCfg)> {
    vec![
        (
            "google".to_string(),
            ProviderCfg {
                client_id: None,
                client_secret: None,
                auth_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
                token_url: "https://oauth2.googleapis.com/token".to_string(),
                userinfo_url: "https://www.googleapis.com/oauth2/v3/userinfo".to_string(),
                scopes: "openid email profile".to_string(),
                mode: default_provider_mode(),
            },
        ),
        (
            "naver".to_string(),
            ProviderCfg {
                client_id: None,
                client_secret: None,
                auth_url: "https://nid.naver.com/oauth2.0/authorize".to_string(),
                token_url: "https://nid.naver.com/oauth2.0/token".to_string(),
                userinfo_url: "https://openapi.naver.com/v1/nid/me".to_string(),
                // Naver scopes its profile fields through app registration
                scopes: String::new(),
                mode: default_provider_mode(),
            },
        ),
        (
            "kakao".to_string(),
            ProviderCfg {
                client_id: None,
                client_secret: None,
                auth_url: "https://kauth.kakao.com/oauth/authorize".to_string(),
                token_url: "https://kauth.kakao.com/oauth/token".to_string(),
                userinfo_url: "https://kapi.kakao.com/v2/user/me".to_string(),
                scopes: "profile_nickname account_email".to_string(),
                mode: default_provider_mode(),
            },
        ),
    ]
}

fn apply_env_overrides(key: &str, cfg: &mut ProviderCfg) {
    let prefix = key.to_ascii_uppercase();
    if let Ok(v) = std::env::var(format!("{}_CLIENT_ID", prefix)) {
        cfg.client_id = Some(v);
    }
    if let Ok(v) = std::env::var(format!("{}_CLIENT_SECRET", prefix)) {
        cfg.client_secret = Some(v);
    }
    if let Ok(v) = std::env::var(format!("{}_AUTH_MODE", prefix)) {
        cfg.mode = v;
    }
}

pub fn decode_cookie_key(b64: &str) -> anyhow::Result<[u8; 64]> {
    // tower-cookies expects a 64-byte key for Private (32 signing + 32 encryption)
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.as_bytes())
        .map_err(|e| anyhow::anyhow!("invalid COOKIE_KEY_BASE64: {}", e))?;
    if bytes.len() == 32 {
        // A 32-byte key is duplicated to cover both halves
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&bytes);
        out[32..].copy_from_slice(&bytes);
        return Ok(out);
    }
    if bytes.len() != 64 {
        return Err(anyhow::anyhow!(
            "COOKIE_KEY_BASE64 must decode to 32 or 64 bytes, got {}",
            bytes.len()
        ));
    }
    let mut out = [0u8; 64];
    out.copy_from_slice(&bytes);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::decode_cookie_key;
    use base64::Engine as _;

    #[test]
    fn short_keys_are_rejected() {
        let b64 = base64::engine::general_purpose::STANDARD.encode([1u8; 16]);
        assert!(decode_cookie_key(&b64).is_err());
        assert!(decode_cookie_key("not base64!").is_err());
    }

    #[test]
    fn a_32_byte_key_is_widened_to_64() {
        let b64 = base64::engine::general_purpose::STANDARD.encode([7u8; 32]);
        let key = decode_cookie_key(&b64).unwrap();
        assert_eq!(&key[..32], &key[32..]);
    }
}
