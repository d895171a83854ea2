use std::sync::Arc;

use axum::response::{IntoResponse, Redirect, Response};
use tower_cookies::Cookies;
use url::Url;

use crate::auth::{
    flow::{self, RedirectContext},
    principal::AuthOutcome,
    unlink::ProviderUnlinker,
};

pub const ERROR_PARAM: &str = "error";
pub const LOGIN_FAILED: &str = "Login failed";

// TODO: swap these for tokens minted by a real issuer; the frontend contract
// only requires the parameters to be present for now.
const PLACEHOLDER_ACCESS_TOKEN: &str = "test_access_token";
const PLACEHOLDER_REFRESH_TOKEN: &str = "test_refresh_token";

/// Which post-authentication flow the frontend asked for via the mode cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMode {
    Login,
    Unlink,
}

impl LoginMode {
    pub fn parse(s: &str) -> Option<LoginMode> {
        if s.eq_ignore_ascii_case("login") {
            Some(LoginMode::Login)
        } else if s.eq_ignore_ascii_case("unlink") {
            Some(LoginMode::Unlink)
        } else {
            None
        }
    }
}

/// Terminates a completed authentication attempt: computes the frontend
/// redirect, clears the flow cookies and triggers the unlink side effect
/// when the flow asked for one.
pub struct SuccessHandler {
    default_redirect_url: String,
    unlinker: Arc<dyn ProviderUnlinker>,
}

impl SuccessHandler {
    pub fn new(default_redirect_url: String, unlinker: Arc<dyn ProviderUnlinker>) -> Self {
        Self {
            default_redirect_url,
            unlinker,
        }
    }

    /// `response_started` is set when an upstream layer has already begun
    /// writing the response; redirecting on top of it would corrupt the
    /// stream, so the whole dispatch becomes a logged no-op.
    pub async fn handle(
        &self,
        cookies: &Cookies,
        outcome: &AuthOutcome,
        response_started: bool,
    ) -> anyhow::Result<Option<Response>> {
        if response_started {
            tracing::debug!("response already started, skipping post-login redirect");
            return Ok(None);
        }
        let ctx = flow::redirect_context(cookies);
        let target = self.determine_target_url(&ctx, outcome).await?;
        flow::remove_flow_cookies(cookies);
        Ok(Some(Redirect::temporary(&target).into_response()))
    }

    /// Computes where to send the user after authentication. Unlinking is
    /// triggered from here so a failed revocation aborts the redirect and
    /// propagates to the caller.
    pub async fn determine_target_url(
        &self,
        ctx: &RedirectContext,
        outcome: &AuthOutcome,
    ) -> anyhow::Result<String> {
        let target = ctx.redirect_uri.as_deref().unwrap_or(&self.default_redirect_url);
        let mode = ctx.mode.as_deref().unwrap_or("");

        let AuthOutcome::Authenticated(principal) = outcome else {
            return with_query(target, &[(ERROR_PARAM, LOGIN_FAILED)]);
        };

        match LoginMode::parse(mode) {
            Some(LoginMode::Login) => {
                let info = &principal.user_info;
                // Access token deliberately left out of the log line.
                tracing::info!(
                    provider = %info.provider,
                    email = ?info.email,
                    name = ?info.name,
                    nickname = ?info.nickname,
                    "login completed"
                );
                with_query(
                    target,
                    &[
                        ("access_token", PLACEHOLDER_ACCESS_TOKEN),
                        ("refresh_token", PLACEHOLDER_REFRESH_TOKEN),
                    ],
                )
            }
            Some(LoginMode::Unlink) => {
                let info = &principal.user_info;
                self.unlinker.unlink(info.provider, &info.access_token).await?;
                with_query(target, &[])
            }
            None => with_query(target, &[(ERROR_PARAM, LOGIN_FAILED)]),
        }
    }
}

/// Appends query parameters to a base URL, validating the base on the way.
fn with_query(base: &str, params: &[(&str, &str)]) -> anyhow::Result<String> {
    let mut url = Url::parse(base)
        .map_err(|e| anyhow::anyhow!("invalid redirect target {}: {}", base, e))?;
    if !params.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in params {
            pairs.append_pair(k, v);
        }
    }
    Ok(url.to_string())
}

#[cfg(test)]
mod tests {
    use super::LoginMode;

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!(LoginMode::parse("login"), Some(LoginMode::Login));
        assert_eq!(LoginMode::parse("LOGIN"), Some(LoginMode::Login));
        assert_eq!(LoginMode::parse("Unlink"), Some(LoginMode::Unlink));
    }

    #[test]
    fn mode_parse_rejects_unknown_values() {
        assert_eq!(LoginMode::parse(""), None);
        assert_eq!(LoginMode::parse("foo"), None);
        assert_eq!(LoginMode::parse("log in"), None);
    }
}
