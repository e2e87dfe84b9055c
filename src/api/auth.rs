//! Authentication API endpoints
//!
//! Handles the admin session lifecycle:
//! - POST /api/auth/login - Check credentials, set session cookies
//! - POST /api/auth/refresh - Rotate the token pair from the refresh cookie
//! - POST /api/auth/logout - Clear session cookies
//!
//! Every response carries `Cache-Control: no-store`, `Pragma: no-cache` and
//! `X-Content-Type-Options: nosniff`.

use axum::{
    extract::State,
    http::HeaderMap,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

use crate::api::cookies::{
    self, AuthCookies, REFRESH_TOKEN_COOKIE, REMEMBER_ME_COOKIE,
};
use crate::api::middleware::{auth_security_headers, ApiError, AppState};
use crate::models::{AdminUser, Session, SessionInfo};
use crate::services::Throttle;

/// Request body for admin login
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Response for login and refresh. Token values are never included.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: AdminUser,
    pub session: SessionInfo,
}

/// Response for logout
#[derive(Debug, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Build the auth router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .layer(axum_middleware::from_fn(auth_security_headers))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ip_address = extract_ip_address(&headers);

    if let Some(ip) = ip_address {
        if let Throttle::Limited { retry_after } = state.rate_limiter.hit_ip(ip).await {
            tracing::warn!(ip = %ip, "login rejected: IP rate limit exceeded");
            return Err(ApiError::rate_limited(retry_after));
        }
    }

    if let Throttle::Limited { retry_after } = state.rate_limiter.check_email(&body.email).await {
        tracing::warn!(email = %body.email, ip = ?ip_address, "login rejected: too many failed attempts");
        return Err(ApiError::rate_limited(retry_after));
    }

    let verified = state
        .verifier
        .verify(&body.email, &body.password)
        .await
        .map_err(|e| {
            tracing::error!("Credential verification failed: {:#}", e);
            ApiError::internal_error("Login failed")
        })?;

    let Some(user) = verified else {
        state.rate_limiter.record_failure(&body.email).await;
        tracing::warn!(email = %body.email, ip = ?ip_address, "login rejected: invalid credentials");
        return Err(ApiError::invalid_credentials());
    };

    state.rate_limiter.clear_failures(&body.email).await;

    let session = state.issuer.issue_session(body.remember_me);
    let mut response_headers = HeaderMap::new();
    write_session_cookies(&state, &session, &mut response_headers)?;

    tracing::info!(
        email = %user.email,
        ip = ?ip_address,
        remember_me = session.remember_me,
        "admin logged in"
    );

    Ok((
        response_headers,
        Json(SessionResponse {
            user,
            session: session.info(),
        }),
    ))
}

/// POST /api/auth/refresh
///
/// Any refresh cookie the session store knows is accepted, and the old one
/// stays usable after rotation.
async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let refresh_token = cookies::read_cookie(&headers, REFRESH_TOKEN_COOKIE)
        .ok_or_else(ApiError::refresh_token_missing)?;

    let record = state
        .session_store
        .lookup(&refresh_token)
        .await
        .map_err(|e| {
            tracing::error!("Session lookup failed: {:#}", e);
            ApiError::internal_error("Session lookup failed")
        })?;
    if record.is_none() {
        return Err(ApiError::refresh_token_unknown());
    }

    let remember_me = cookies::read_cookie(&headers, REMEMBER_ME_COOKIE).as_deref() == Some("1");

    let session = state.issuer.issue_session(remember_me);
    let mut response_headers = HeaderMap::new();
    write_session_cookies(&state, &session, &mut response_headers)?;

    tracing::info!(remember_me, "session refreshed");

    Ok((
        response_headers,
        Json(SessionResponse {
            user: state.admin.clone(),
            session: session.info(),
        }),
    ))
}

/// POST /api/auth/logout
///
/// Unconditional and idempotent.
async fn logout(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let mut response_headers = HeaderMap::new();
    cookies::clear_auth_cookies(&mut response_headers, state.secure_cookies)?;
    cookies::clear_remember_me_cookie(&mut response_headers, state.secure_cookies)?;

    tracing::info!("admin logged out");

    Ok((response_headers, Json(LogoutResponse { success: true })))
}

/// Set both auth cookies, then the `remember_me` flag for the same tier.
fn write_session_cookies(
    state: &AppState,
    session: &Session,
    headers: &mut HeaderMap,
) -> Result<(), ApiError> {
    let policy = state.issuer.policy();
    let refresh_ttl_seconds = policy.refresh_ttl_seconds(session.remember_me);

    cookies::set_auth_cookies(
        headers,
        AuthCookies {
            access: &session.access_token,
            refresh: &session.refresh_token,
            access_ttl_seconds: policy.access_ttl_seconds,
            refresh_ttl_seconds,
        },
        state.secure_cookies,
    )?;
    cookies::set_remember_me_cookie(
        headers,
        session.remember_me,
        refresh_ttl_seconds,
        state.secure_cookies,
    )?;
    Ok(())
}

/// Client IP from `X-Forwarded-For` (first entry) or `X-Real-IP`
fn extract_ip_address(headers: &HeaderMap) -> Option<IpAddr> {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|h| h.to_str().ok()) {
        if let Some(ip) = forwarded.split(',').next().and_then(|ip| ip.trim().parse().ok()) {
            return Some(ip);
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .and_then(|ip| ip.trim().parse().ok())
}
