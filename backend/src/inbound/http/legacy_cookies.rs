//! Read-only support for the plaintext `username`/`userId` cookies set by
//! earlier dashboard builds.
//!
//! These cookies are never issued any more. `GET /api/v1/session` reads them
//! once to upgrade a visitor into the encrypted session, then expires them.

use std::collections::BTreeMap;

use actix_web::cookie::Cookie;
use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponseBuilder};

use crate::domain::{IDENTITY_COOKIE, SessionState, USER_ID_COOKIE, resolve_from_cookies};

/// Decode a raw `Cookie` header into name/value pairs.
///
/// Pairs are separated by `;` and percent-decoded. Malformed pairs are
/// skipped; when a name repeats, the first occurrence wins.
///
/// # Examples
/// ```
/// use guardian_vision::inbound::http::legacy_cookies::parse_cookie_header;
///
/// let jar = parse_cookie_header("username=GV%20-%20PT%20-%207; userId=7");
/// assert_eq!(jar.get("username").map(String::as_str), Some("GV - PT - 7"));
/// assert_eq!(jar.get("userId").map(String::as_str), Some("7"));
/// ```
pub fn parse_cookie_header(raw: &str) -> BTreeMap<String, String> {
    let mut jar = BTreeMap::new();
    for pair in raw.split(';').map(str::trim).filter(|pair| !pair.is_empty()) {
        let Ok(cookie) = Cookie::parse_encoded(pair) else {
            continue;
        };
        if cookie.name().is_empty() {
            continue;
        }
        jar.entry(cookie.name().to_owned())
            .or_insert_with(|| cookie.value().to_owned());
    }
    jar
}

/// Resolve a session from a raw `Cookie` header.
pub fn resolve_cookie_header(raw: &str) -> SessionState {
    resolve_from_cookies(&parse_cookie_header(raw))
}

/// Resolve the legacy session carried by `req`, if any.
pub(crate) fn resolve_request(req: &HttpRequest) -> SessionState {
    req.headers()
        .get_all(header::COOKIE)
        .filter_map(|value| value.to_str().ok())
        .map(resolve_cookie_header)
        .find(|state| matches!(state, SessionState::Authenticated(_)))
        .unwrap_or(SessionState::Anonymous)
}

/// Expire both legacy cookies on the response.
pub(crate) fn expire(builder: &mut HttpResponseBuilder) {
    for name in [IDENTITY_COOKIE, USER_ID_COOKIE] {
        let mut cookie = Cookie::build(name, "").path("/").finish();
        cookie.make_removal();
        builder.cookie(cookie);
    }
}
