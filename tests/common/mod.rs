#![allow(dead_code)]

//! Shared fixtures for router-level tests.

use axum::{
    body::Body,
    extract::Request,
    http::{header, Method},
    middleware::Next,
    response::Response,
    Router,
};
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use vitrine::api::{self, AppState, LocaleRouter};
use vitrine::config::{Config, Environment};
use vitrine::services::hash_password;

pub const ADMIN_EMAIL: &str = "owner@example.com";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

static ADMIN_HASH: Lazy<String> = Lazy::new(|| hash_password(ADMIN_PASSWORD).unwrap());

pub fn test_config(environment: Environment) -> Config {
    let mut config = Config::default();
    config.server.environment = environment;
    config.server.public_dir = "tests/no-such-public-dir".into();
    config.auth.admin_email = ADMIN_EMAIL.to_string();
    config.auth.admin_password_hash = ADMIN_HASH.clone();
    config
}

pub fn test_state() -> AppState {
    AppState::from_config(&test_config(Environment::Development))
}

pub fn test_app(state: AppState) -> Router {
    api::build_router(state, "http://localhost:3000", Path::new("tests/no-such-public-dir")).unwrap()
}

/// Locale router that counts calls and then serves the request unchanged
#[derive(Debug, Default)]
pub struct CountingLocaleRouter {
    calls: AtomicUsize,
}

impl CountingLocaleRouter {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LocaleRouter for CountingLocaleRouter {
    async fn route(&self, request: Request, next: Next) -> Response {
        self.calls.fetch_add(1, Ordering::SeqCst);
        next.run(request).await
    }
}

pub fn counting_state() -> (AppState, Arc<CountingLocaleRouter>) {
    let locale = Arc::new(CountingLocaleRouter::default());
    let state = test_state().with_locale_router(locale.clone());
    (state, locale)
}

pub fn post(uri: &str) -> axum::http::request::Builder {
    Request::builder().method(Method::POST).uri(uri)
}

pub fn login_request(email: &str, password: &str, remember_me: bool) -> Request<Body> {
    post("/api/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({
                "email": email,
                "password": password,
                "rememberMe": remember_me,
            })
            .to_string(),
        ))
        .unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}

pub fn assert_security_headers(response: &Response) {
    let headers = response.headers();
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    assert_eq!(headers.get(header::PRAGMA).unwrap(), "no-cache");
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
}

/// `name=value` of a `Set-Cookie` line
pub fn cookie_pair(set_cookie: &str) -> &str {
    set_cookie.split(';').next().unwrap_or_default()
}
