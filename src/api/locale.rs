//! Locale routing
//!
//! Public pages live under a locale segment (`/en/...`, `/fr/...`). The
//! session guard hands every non-protected request to a [`LocaleRouter`].
//! [`PrefixLocaleRouter`] only adds a missing locale prefix; translation
//! lookup happens elsewhere.

use async_trait::async_trait;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::config::LocaleConfig;

/// Routes a public request, usually by running `next`
#[async_trait]
pub trait LocaleRouter: Send + Sync {
    async fn route(&self, request: Request, next: Next) -> Response;
}

/// Redirects paths without a known locale segment to the default locale
#[derive(Debug, Clone)]
pub struct PrefixLocaleRouter {
    locales: Vec<String>,
    default_locale: String,
}

impl PrefixLocaleRouter {
    pub fn new(locales: Vec<String>, default_locale: impl Into<String>) -> Self {
        Self {
            locales,
            default_locale: default_locale.into(),
        }
    }

    pub fn from_config(config: &LocaleConfig) -> Self {
        Self::new(config.locales.clone(), config.default_locale.clone())
    }

    /// Where to send `path`, or `None` when it is served as is.
    ///
    /// Left alone: `/api/...`, paths whose last segment has a file extension,
    /// and paths that already start with a configured locale.
    pub fn locale_target(&self, path: &str, query: Option<&str>) -> Option<String> {
        let first_segment = path.trim_start_matches('/').split('/').next().unwrap_or("");
        if first_segment == "api" {
            return None;
        }
        if path.rsplit('/').next().is_some_and(|last| last.contains('.')) {
            return None;
        }
        if self.locales.iter().any(|locale| locale == first_segment) {
            return None;
        }

        let mut target = format!("/{}", self.default_locale);
        if path != "/" {
            target.push_str(path);
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            target.push('?');
            target.push_str(query);
        }
        Some(target)
    }
}

#[async_trait]
impl LocaleRouter for PrefixLocaleRouter {
    async fn route(&self, request: Request, next: Next) -> Response {
        let uri = request.uri();
        match self.locale_target(uri.path(), uri.query()) {
            Some(target) => Redirect::temporary(&target).into_response(),
            None => next.run(request).await,
        }
    }
}
