use serde::{Deserialize, Serialize};

use crate::auth::provider::Provider;

/// Outcome of an authentication attempt at the callback boundary.
///
/// `Unauthenticated` covers every path that fails to produce a typed
/// principal: a provider error parameter, missing or mismatched CSRF state,
/// a failed code exchange or userinfo fetch. Callers only branch on the two
/// variants and never inspect why authentication fell through.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Authenticated(OAuth2Principal),
    Unauthenticated,
}

/// The authenticated identity produced by a completed provider round-trip.
#[derive(Debug, Clone)]
pub struct OAuth2Principal {
    pub user_info: UserInfo,
}

/// Provider-normalized identity attributes plus the provider access token
/// obtained in the code exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub provider: Provider,
    pub subject: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub nickname: Option<String>,
    pub access_token: String,
}
