//! Session cookie codec
//!
//! Writes and reads the three session cookies:
//! - `access_token` and `refresh_token`: HttpOnly, `SameSite=Lax`, `Path=/`,
//!   `Secure` in production. Always written together, access first.
//! - `remember_me`: readable flag, `"1"` or absent.

use axum::http::{
    header::{self, InvalidHeaderValue},
    HeaderMap, HeaderValue,
};
use cookie::{time::Duration, Cookie, SameSite};

pub const ACCESS_TOKEN_COOKIE: &str = "access_token";
pub const REFRESH_TOKEN_COOKIE: &str = "refresh_token";
pub const REMEMBER_ME_COOKIE: &str = "remember_me";

/// Values and lifetimes for one `set_auth_cookies` call
#[derive(Debug, Clone, Copy)]
pub struct AuthCookies<'a> {
    pub access: &'a str,
    pub refresh: &'a str,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_seconds: i64,
}

fn session_cookie(name: &'static str, value: String, max_age: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(Duration::seconds(max_age))
        .build()
}

fn append(headers: &mut HeaderMap, cookie: &Cookie<'_>) -> Result<(), InvalidHeaderValue> {
    headers.append(header::SET_COOKIE, HeaderValue::from_str(&cookie.to_string())?);
    Ok(())
}

/// Append the access then the refresh `Set-Cookie` header.
pub fn set_auth_cookies(
    headers: &mut HeaderMap,
    cookies: AuthCookies<'_>,
    secure: bool,
) -> Result<(), InvalidHeaderValue> {
    let access = session_cookie(
        ACCESS_TOKEN_COOKIE,
        cookies.access.to_string(),
        cookies.access_ttl_seconds,
        secure,
    );
    let refresh = session_cookie(
        REFRESH_TOKEN_COOKIE,
        cookies.refresh.to_string(),
        cookies.refresh_ttl_seconds,
        secure,
    );

    // Encode both before touching the map so a failure leaves it unchanged.
    let access = HeaderValue::from_str(&access.to_string())?;
    let refresh = HeaderValue::from_str(&refresh.to_string())?;
    headers.append(header::SET_COOKIE, access);
    headers.append(header::SET_COOKIE, refresh);
    Ok(())
}

/// Overwrite both auth cookies with an empty value and `Max-Age=0`.
pub fn clear_auth_cookies(headers: &mut HeaderMap, secure: bool) -> Result<(), InvalidHeaderValue> {
    append(headers, &session_cookie(ACCESS_TOKEN_COOKIE, String::new(), 0, secure))?;
    append(headers, &session_cookie(REFRESH_TOKEN_COOKIE, String::new(), 0, secure))
}

/// Write `remember_me=1` for `ttl_seconds`, or clear it when `remember_me` is false.
pub fn set_remember_me_cookie(
    headers: &mut HeaderMap,
    remember_me: bool,
    ttl_seconds: i64,
    secure: bool,
) -> Result<(), InvalidHeaderValue> {
    if !remember_me {
        return clear_remember_me_cookie(headers, secure);
    }
    append(headers, &flag_cookie("1", ttl_seconds, secure))
}

/// Expire the `remember_me` flag
pub fn clear_remember_me_cookie(headers: &mut HeaderMap, secure: bool) -> Result<(), InvalidHeaderValue> {
    append(headers, &flag_cookie("", 0, secure))
}

fn flag_cookie(value: &'static str, max_age: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((REMEMBER_ME_COOKIE, value))
        .same_site(SameSite::Lax)
        .secure(secure)
        .path("/")
        .max_age(Duration::seconds(max_age))
        .build()
}

/// Presence check on a raw `Cookie` header.
///
/// True iff `access_token=` appears at the start of the header or right
/// after a `;` and optional whitespace. The value itself is not inspected.
pub fn has_access_token_cookie(cookie_header: &str) -> bool {
    let needle = "access_token=";
    let mut parts = cookie_header.split(';');

    if parts.next().is_some_and(|first| first.starts_with(needle)) {
        return true;
    }
    parts.any(|part| part.trim_start().starts_with(needle))
}

/// First non-empty value of cookie `name` across all `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    cookie_header_values(headers)
        .flat_map(|raw| Cookie::split_parse(raw))
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

/// Raw `Cookie` header values joined with `; `
pub fn raw_cookie_header(headers: &HeaderMap) -> String {
    cookie_header_values(headers).collect::<Vec<_>>().join("; ")
}

/// `Cookie` header values decoded lossily. Non-ASCII bytes in one cookie
/// must not hide the others.
fn cookie_header_values(headers: &HeaderMap) -> impl Iterator<Item = String> + '_ {
    headers
        .get_all(header::COOKIE)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn set_always_writes_access_then_refresh(
            access in "[a-f0-9-]{1,36}",
            refresh in "[a-f0-9-]{1,36}",
            access_ttl in 1i64..100_000,
            refresh_ttl in 1i64..10_000_000,
            secure in prop::bool::ANY,
        ) {
            let mut headers = HeaderMap::new();
            set_auth_cookies(&mut headers, AuthCookies {
                access: &access,
                refresh: &refresh,
                access_ttl_seconds: access_ttl,
                refresh_ttl_seconds: refresh_ttl,
            }, secure).unwrap();

            let cookies: Vec<_> = headers.get_all(header::SET_COOKIE).iter()
                .map(|v| v.to_str().unwrap().to_string())
                .collect();
            prop_assert_eq!(cookies.len(), 2);
            let access_prefix = format!("access_token={};", access);
            let refresh_prefix = format!("refresh_token={};", refresh);
            prop_assert!(cookies[0].starts_with(&access_prefix));
            prop_assert!(cookies[1].starts_with(&refresh_prefix));
            prop_assert!(cookies.iter().all(|c| c.contains("HttpOnly")));
            prop_assert!(cookies.iter().all(|c| c.contains("Secure") == secure));
        }

        #[test]
        fn presence_ignores_other_cookie_names(name in "[b-z][a-z_]{0,12}", value in "[a-z0-9]{0,12}") {
            let header = format!("{}={}", name, value);
            prop_assert!(!has_access_token_cookie(&header));
            let with_access = format!("{}; access_token={}", header, value);
            prop_assert!(has_access_token_cookie(&with_access));
        }
    }
}
