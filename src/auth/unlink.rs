use async_trait::async_trait;

use crate::auth::provider::Provider;
use crate::config::AppConfig;

const GOOGLE_REVOKE_URL: &str = "https://oauth2.googleapis.com/revoke";
const NAVER_REVOKE_URL: &str = "https://nid.naver.com/oauth2.0/token";
const KAKAO_UNLINK_URL: &str = "https://kapi.kakao.com/v1/user/unlink";

/// Revokes the association between this application and a third-party
/// provider account.
#[async_trait]
pub trait ProviderUnlinker: Send + Sync {
    async fn unlink(&self, provider: Provider, access_token: &str) -> anyhow::Result<()>;
}

/// Calls the providers' revocation endpoints. Naver revokes through its
/// token endpoint and requires the registered client credentials alongside
/// the user's access token; google and kakao only need the token itself.
pub struct HttpProviderUnlinker {
    http: reqwest::Client,
    naver_client_id: Option<String>,
    naver_client_secret: Option<String>,
}

impl HttpProviderUnlinker {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Self {
        let naver = config.provider(Provider::Naver);
        Self {
            http,
            naver_client_id: naver.and_then(|p| p.client_id.clone()),
            naver_client_secret: naver.and_then(|p| p.client_secret.clone()),
        }
    }
}

#[async_trait]
impl ProviderUnlinker for HttpProviderUnlinker {
    async fn unlink(&self, provider: Provider, access_token: &str) -> anyhow::Result<()> {
        let res = match provider {
            Provider::Google => {
                self.http
                    .post(GOOGLE_REVOKE_URL)
                    .form(&[("token", access_token)])
                    .send()
                    .await?
            }
            Provider::Naver => {
                let client_id = self
                    .naver_client_id
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("naver client_id not configured"))?;
                let client_secret = self
                    .naver_client_secret
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("naver client_secret not configured"))?;
                self.http
                    .get(NAVER_REVOKE_URL)
                    .query(&[
                        ("grant_type", "delete"),
                        ("client_id", client_id),
                        ("client_secret", client_secret),
                        ("access_token", access_token),
                        ("service_provider", "NAVER"),
                    ])
                    .send()
                    .await?
            }
            Provider::Kakao => {
                self.http
                    .post(KAKAO_UNLINK_URL)
                    .bearer_auth(access_token)
                    .send()
                    .await?
            }
        };

        res.error_for_status()
            .map_err(|e| anyhow::anyhow!("{} unlink failed: {}", provider, e))?;
        tracing::info!(%provider, "unlinked provider identity");
        Ok(())
    }
}
