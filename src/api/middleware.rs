//! API middleware
//!
//! Contains:
//! - Shared application state
//! - The API error type and its JSON shape
//! - Security headers for the auth endpoints

use axum::{
    extract::Request,
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::guard::RouteRules;
use crate::api::locale::{LocaleRouter, PrefixLocaleRouter};
use crate::config::Config;
use crate::models::AdminUser;
use crate::services::{
    CredentialVerifier, LoginRateLimiter, PresenceOnlyStore, SessionStore, StaticAdminVerifier,
    TokenIssuer,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    /// Mark cookies `Secure` (production only)
    pub secure_cookies: bool,
    /// Principal reported by login and refresh responses
    pub admin: AdminUser,
    pub issuer: TokenIssuer,
    pub verifier: Arc<dyn CredentialVerifier>,
    pub session_store: Arc<dyn SessionStore>,
    pub rate_limiter: Arc<LoginRateLimiter>,
    pub locale_router: Arc<dyn LocaleRouter>,
    pub route_rules: Arc<RouteRules>,
}

impl AppState {
    /// Wire the default services from configuration
    pub fn from_config(config: &Config) -> Self {
        let admin_email = config.auth.admin_email.trim().to_lowercase();
        Self {
            secure_cookies: config.server.environment.secure_cookies(),
            admin: AdminUser::new(admin_email),
            issuer: TokenIssuer::new(config.auth.ttl_policy()),
            verifier: Arc::new(StaticAdminVerifier::from_config(&config.auth)),
            session_store: Arc::new(PresenceOnlyStore),
            rate_limiter: Arc::new(LoginRateLimiter::new(config.rate_limit.clone())),
            locale_router: Arc::new(PrefixLocaleRouter::from_config(&config.locale)),
            route_rules: Arc::new(RouteRules::from_config(&config.auth)),
        }
    }

    pub fn with_verifier(mut self, verifier: Arc<dyn CredentialVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = store;
        self
    }

    pub fn with_locale_router(mut self, router: Arc<dyn LocaleRouter>) -> Self {
        self.locale_router = router;
        self
    }
}

/// Error response for API errors.
///
/// Serialized flat: `{"error": "<Code>", "message": ..., "details": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

pub const REFRESH_TOKEN_MISSING: &str = "RefreshTokenMissing";
pub const REFRESH_TOKEN_UNKNOWN: &str = "RefreshTokenUnknown";
pub const INVALID_CREDENTIALS: &str = "InvalidCredentials";
pub const RATE_LIMITED: &str = "RateLimited";
pub const INTERNAL_ERROR: &str = "InternalError";

/// Shown for every rejected login, whichever field was wrong
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid email or password";

impl ApiError {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            error: code.into(),
            message: None,
            details: None,
        }
    }

    pub fn with_message(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::new(code)
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::with_message(code, message)
        }
    }

    pub fn refresh_token_missing() -> Self {
        Self::new(REFRESH_TOKEN_MISSING)
    }

    pub fn refresh_token_unknown() -> Self {
        Self::new(REFRESH_TOKEN_UNKNOWN)
    }

    pub fn invalid_credentials() -> Self {
        Self::with_message(INVALID_CREDENTIALS, INVALID_CREDENTIALS_MESSAGE)
    }

    pub fn rate_limited(retry_after: i64) -> Self {
        Self::with_details(
            RATE_LIMITED,
            "Too many login attempts, please try again later",
            serde_json::json!({ "retryAfter": retry_after }),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::with_message(INTERNAL_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.as_str() {
            REFRESH_TOKEN_MISSING | REFRESH_TOKEN_UNKNOWN | INVALID_CREDENTIALS => {
                StatusCode::UNAUTHORIZED
            }
            RATE_LIMITED => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<header::InvalidHeaderValue> for ApiError {
    fn from(e: header::InvalidHeaderValue) -> Self {
        tracing::error!("Failed to encode response header: {}", e);
        Self::internal_error("Failed to encode session cookies")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Attach the fixed security header set to every auth response
pub async fn auth_security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}
