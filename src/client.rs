//! Login form client
//!
//! Submits admin credentials to `/api/auth/login` and reduces the outcome to
//! what a login form shows: a session, one generic credentials message, a
//! throttling message, or a distinct network message.

use serde::Deserialize;

use crate::api::auth::{LoginRequest, SessionResponse};

/// Why a login attempt did not produce a session
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    /// Wrong email, wrong password, or any other refusal
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Too many login attempts, try again in {retry_after} seconds")]
    RateLimited { retry_after: i64 },
    #[error("Could not reach the server, please try again")]
    Network(#[source] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct RateLimitedBody {
    details: Option<RetryDetails>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RetryDetails {
    retry_after: i64,
}

/// HTTP client for the auth endpoints
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// POST the login form
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        remember_me: bool,
    ) -> Result<SessionResponse, LoginError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
            remember_me,
        };

        let response = self
            .http
            .post(format!("{}/api/auth/login", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(LoginError::Network)?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .json::<RateLimitedBody>()
                .await
                .ok()
                .and_then(|body| body.details)
                .map(|details| details.retry_after)
                .unwrap_or(60);
            return Err(LoginError::RateLimited { retry_after });
        }
        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "login refused");
            return Err(LoginError::InvalidCredentials);
        }

        response.json().await.map_err(LoginError::Network)
    }
}

/// Page to open after a successful login.
///
/// `from` is honored only when it is a same-site path inside the protected
/// area and not the login page itself; otherwise the protected home is used.
pub fn post_login_target(from: Option<&str>, protected_prefix: &str, login_path: &str) -> String {
    let allowed = from.filter(|target| {
        let path = target.split(['?', '#']).next().unwrap_or_default();
        !target.starts_with("//")
            && !target.contains('\\')
            && within(path, protected_prefix)
            && !within(path, login_path)
    });

    allowed.unwrap_or(protected_prefix).to_string()
}

/// `path` is `base` or a segment below it
fn within(path: &str, base: &str) -> bool {
    let base = base.trim_end_matches('/');
    path.strip_prefix(base)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}
