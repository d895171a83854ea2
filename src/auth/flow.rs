use time::Duration;
use tower_cookies::{Cookie, Cookies, Key};

use crate::auth::provider::Provider;

pub const REDIRECT_URI_COOKIE: &str = "redirect_uri";
pub const MODE_COOKIE: &str = "mode";

const STATE_COOKIE_PREFIX: &str = "auth_state_";
const FLOW_COOKIE_TTL_MINUTES: i64 = 10;

/// Request-scoped redirect parameters recovered from the flow cookies.
#[derive(Debug, Clone, Default)]
pub struct RedirectContext {
    pub redirect_uri: Option<String>,
    pub mode: Option<String>,
}

pub fn redirect_context(cookies: &Cookies) -> RedirectContext {
    RedirectContext {
        redirect_uri: cookies.get(REDIRECT_URI_COOKIE).map(|c| c.value().to_string()),
        mode: cookies.get(MODE_COOKIE).map(|c| c.value().to_string()),
    }
}

/// Stashes the frontend's redirect target and mode for the duration of the
/// provider round-trip. Only parameters the frontend actually sent are
/// written; absent ones fall back at read time.
pub fn store_flow_cookies(cookies: &Cookies, redirect_uri: Option<&str>, mode: Option<&str>) {
    if let Some(uri) = redirect_uri {
        cookies.add(flow_cookie(REDIRECT_URI_COOKIE, uri));
    }
    if let Some(mode) = mode {
        cookies.add(flow_cookie(MODE_COOKIE, mode));
    }
}

pub fn remove_flow_cookies(cookies: &Cookies) {
    for name in [REDIRECT_URI_COOKIE, MODE_COOKIE] {
        let mut c = Cookie::new(name, "");
        c.set_path("/");
        cookies.remove(c);
    }
}

fn flow_cookie(name: &'static str, value: &str) -> Cookie<'static> {
    let mut c = Cookie::new(name, value.to_string());
    c.set_path("/");
    c.set_http_only(true);
    c.set_same_site(tower_cookies::cookie::SameSite::Lax);
    c.set_secure(is_https());
    c.set_max_age(Duration::minutes(FLOW_COOKIE_TTL_MINUTES));
    c
}

fn state_cookie_name(provider: Provider) -> String {
    format!("{}{}", STATE_COOKIE_PREFIX, provider)
}

/// Persists the CSRF state for a live provider flow in an encrypted cookie.
pub fn write_state(cookies: &Cookies, key: &Key, provider: Provider, state: &str) {
    let mut c = Cookie::new(state_cookie_name(provider), state.to_string());
    c.set_path("/");
    c.set_http_only(true);
    c.set_same_site(tower_cookies::cookie::SameSite::Lax);
    c.set_secure(is_https());
    c.set_max_age(Duration::minutes(FLOW_COOKIE_TTL_MINUTES));
    cookies.private(key).add(c);
}

/// Reads and removes the stored CSRF state, so each state is single-use.
pub fn take_state(cookies: &Cookies, key: &Key, provider: Provider) -> Option<String> {
    let name = state_cookie_name(provider);
    let c = cookies.private(key).get(&name)?;
    let value = c.value().to_string();
    cookies.private(key).remove(c);
    Some(value)
}

pub(crate) fn is_https() -> bool {
    // Use environment hint; default to false for local dev
    matches!(std::env::var("APP_FORCE_SECURE").as_deref(), Ok("1") | Ok("true") | Ok("yes"))
}
