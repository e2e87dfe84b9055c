//! Session guard
//!
//! Every request passes through [`session_guard`] before any page or API
//! handler runs. The decision is stateless and depends on the path, the query
//! and the presence of an `access_token` cookie:
//!
//! 1. protected path, no access cookie: redirect to the login entry with `from=<path+query>`
//! 2. protected path or login entry: pass through, skipping locale routing
//! 3. anything else: hand over to the locale router

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::api::cookies::{has_access_token_cookie, raw_cookie_header};
use crate::api::middleware::AppState;
use crate::config::AuthConfig;

/// One entry of the ordered rule list. First match wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRule {
    /// Always reachable. Matches the path itself and anything below it.
    LoginEntry(String),
    /// Requires an access cookie. Matches any path starting with `prefix`.
    Protected { prefix: String, login_path: String },
    /// Explicitly public. Matches any path starting with the prefix.
    Public(String),
}

impl RouteRule {
    fn matches(&self, path: &str) -> bool {
        match self {
            RouteRule::LoginEntry(login) => {
                path == login
                    || path
                        .strip_prefix(login.as_str())
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            RouteRule::Protected { prefix, .. } => path.starts_with(prefix.as_str()),
            RouteRule::Public(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}

/// What the guard does with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Send the browser here
    Redirect(String),
    /// Serve without locale routing
    PassThrough,
    /// Hand the request to the locale router
    Delegate,
}

/// Ordered route rules; unmatched paths are public
#[derive(Debug, Clone)]
pub struct RouteRules {
    rules: Vec<RouteRule>,
}

impl RouteRules {
    pub fn new(rules: Vec<RouteRule>) -> Self {
        Self { rules }
    }

    /// `[LoginEntry(login_path), Protected(protected_prefix)]`
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(vec![
            RouteRule::LoginEntry(config.login_path.clone()),
            RouteRule::Protected {
                prefix: config.protected_prefix.clone(),
                login_path: config.login_path.clone(),
            },
        ])
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// First rule matching `path`
    pub fn classify(&self, path: &str) -> Option<&RouteRule> {
        self.rules.iter().find(|rule| rule.matches(path))
    }

    /// Decide for `path`, where `path_and_query` is what `from` carries back.
    pub fn decide(&self, path: &str, path_and_query: &str, cookie_header: &str) -> GuardDecision {
        match self.classify(path) {
            Some(RouteRule::LoginEntry(_)) => GuardDecision::PassThrough,
            Some(RouteRule::Protected { login_path, .. }) => {
                if has_access_token_cookie(cookie_header) {
                    GuardDecision::PassThrough
                } else {
                    GuardDecision::Redirect(login_redirect(login_path, path_and_query))
                }
            }
            Some(RouteRule::Public(_)) | None => GuardDecision::Delegate,
        }
    }
}

/// `{login_path}?from={percent-encoded original}`
pub fn login_redirect(login_path: &str, original: &str) -> String {
    format!("{}?from={}", login_path, urlencoding::encode(original))
}

/// Request gate applied ahead of every route
pub async fn session_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let cookie_header = raw_cookie_header(request.headers());
    let uri = request.uri();
    let path_and_query = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| uri.path());
    let decision = state
        .route_rules
        .decide(uri.path(), path_and_query, &cookie_header);

    match decision {
        GuardDecision::Redirect(location) => {
            tracing::debug!(path = %request.uri().path(), %location, "redirecting to login");
            Redirect::temporary(&location).into_response()
        }
        GuardDecision::PassThrough => next.run(request).await,
        GuardDecision::Delegate => state.locale_router.route(request, next).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> RouteRules {
        RouteRules::from_config(&AuthConfig::default())
    }

    #[test]
    fn test_protected_without_cookie_redirects_with_from() {
        let decision = rules().decide("/admin/requests", "/admin/requests?page=1", "");
        assert_eq!(
            decision,
            GuardDecision::Redirect("/admin/login?from=%2Fadmin%2Frequests%3Fpage%3D1".to_string())
        );
    }

    #[test]
    fn test_protected_root_redirects() {
        let decision = rules().decide("/admin", "/admin", "theme=dark");
        assert_eq!(
            decision,
            GuardDecision::Redirect("/admin/login?from=%2Fadmin".to_string())
        );
    }

    #[test]
    fn test_protected_with_cookie_passes() {
        let decision = rules().decide("/admin/reviews", "/admin/reviews", "access_token=token123");
        assert_eq!(decision, GuardDecision::PassThrough);
    }

    #[test]
    fn test_login_entry_always_passes() {
        let rules = rules();
        assert_eq!(rules.decide("/admin/login", "/admin/login", ""), GuardDecision::PassThrough);
        assert_eq!(
            rules.decide("/admin/login/", "/admin/login/?from=x", ""),
            GuardDecision::PassThrough
        );
        assert_eq!(
            rules.decide("/admin/login", "/admin/login", "access_token=abc"),
            GuardDecision::PassThrough
        );
    }

    #[test]
    fn test_login_lookalike_is_still_protected() {
        let decision = rules().decide("/admin/loginx", "/admin/loginx", "");
        assert!(matches!(decision, GuardDecision::Redirect(_)));
    }

    #[test]
    fn test_public_paths_delegate() {
        let rules = rules();
        assert_eq!(rules.decide("/fr/services", "/fr/services", ""), GuardDecision::Delegate);
        assert_eq!(rules.decide("/", "/", "access_token=abc"), GuardDecision::Delegate);
    }

    #[test]
    fn test_ordered_rules_first_match_wins() {
        let rules = RouteRules::new(vec![
            RouteRule::Public("/admin/public".to_string()),
            RouteRule::LoginEntry("/staff/login".to_string()),
            RouteRule::Protected {
                prefix: "/admin".to_string(),
                login_path: "/admin/login".to_string(),
            },
            RouteRule::Protected {
                prefix: "/staff".to_string(),
                login_path: "/staff/login".to_string(),
            },
        ]);

        assert_eq!(
            rules.decide("/admin/public/brochure", "/admin/public/brochure", ""),
            GuardDecision::Delegate
        );
        assert_eq!(
            rules.decide("/staff/rota", "/staff/rota", ""),
            GuardDecision::Redirect("/staff/login?from=%2Fstaff%2Frota".to_string())
        );
        assert_eq!(rules.decide("/staff/login", "/staff/login", ""), GuardDecision::PassThrough);
        assert_eq!(rules.rules().len(), 4);
    }
}
