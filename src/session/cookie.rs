//! Session cookie parsing and emission

use axum::http::{header, HeaderMap, HeaderValue};

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "easel_session";

/// Read a cookie value from request headers
pub fn parse_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for value in headers.get_all(header::COOKIE) {
        let Ok(s) = value.to_str() else { continue };
        for part in s.split(';') {
            if let Some((k, v)) = part.trim().split_once('=') {
                if k == name {
                    return Some(v.to_string());
                }
            }
        }
    }
    None
}

/// Session id from the request cookie, if any
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    parse_cookie(headers, SESSION_COOKIE).filter(|v| !v.is_empty())
}

/// `Set-Cookie` value binding the browser to `sid`
pub fn session_cookie(sid: &str, secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!("{}={}; HttpOnly; SameSite=Strict; Path=/", SESSION_COOKIE, sid);
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}

/// `Set-Cookie` value expiring the session cookie
pub fn clear_session_cookie(secure: bool) -> Option<HeaderValue> {
    let mut cookie = format!(
        "{}=deleted; Expires=Thu, 01 Jan 1970 00:00:00 GMT; HttpOnly; SameSite=Strict; Path=/",
        SESSION_COOKIE
    );
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie).ok()
}
