//! API layer - HTTP handlers and routing
//!
//! It includes:
//! - Auth endpoints (login, refresh, logout)
//! - The session cookie codec
//! - The session guard applied ahead of every route
//! - The locale routing seam for public pages

pub mod auth;
pub mod cookies;
pub mod guard;
pub mod locale;
pub mod middleware;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use std::path::Path;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use guard::{GuardDecision, RouteRule, RouteRules};
pub use locale::{LocaleRouter, PrefixLocaleRouter};
pub use middleware::{ApiError, AppState};

/// Build the API router
pub fn build_api_router() -> Router<AppState> {
    Router::new().nest("/auth", auth::router())
}

/// Build the complete router with middleware.
///
/// Anything that is not an API route is served from `public_dir`.
pub fn build_router(state: AppState, cors_origin: &str, public_dir: &Path) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin '{}'", cors_origin))?;

    // Cookie-based auth needs credentials allowed.
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api", build_api_router())
        .fallback_service(ServeDir::new(public_dir))
        .layer(cors)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            guard::session_guard,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
