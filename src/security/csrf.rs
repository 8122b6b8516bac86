//! CSRF token issuance and verification
//!
//! One token per session, generated lazily from 256 bits of OS randomness
//! and compared in constant time.

use super::{constant_time_eq, hex_encode};
use crate::error::{Error, Result};
use crate::session::Session;
use axum::http::HeaderMap;
use rand::RngCore;

/// Raw token size in bytes (256 bits)
pub const TOKEN_BYTES: usize = 32;

/// Body field carrying the token in form and JSON requests
pub const CSRF_FIELD: &str = "csrf_token";

/// Header carrying the token for script-driven requests
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Return the session's token, generating and storing one if absent
pub fn issue_token(session: &mut Session) -> String {
    session
        .csrf_token
        .get_or_insert_with(|| {
            let mut bytes = [0u8; TOKEN_BYTES];
            rand::thread_rng().fill_bytes(&mut bytes);
            hex_encode(&bytes)
        })
        .clone()
}

/// Verify a supplied token against the session's token
pub fn verify(session: &Session, supplied: Option<&str>) -> Result<()> {
    let expected = session.csrf_token.as_deref().unwrap_or("");
    let supplied = supplied.unwrap_or("");
    if expected.is_empty() || supplied.is_empty() {
        return Err(Error::Forbidden("Invalid CSRF token".to_string()));
    }
    if !constant_time_eq(expected.as_bytes(), supplied.as_bytes()) {
        return Err(Error::Forbidden("Invalid CSRF token".to_string()));
    }
    Ok(())
}

/// Pick the supplied token: body field first, then the `X-CSRF-Token` header
pub fn supplied_token(body_field: Option<&str>, headers: &HeaderMap) -> Option<String> {
    body_field
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| {
            headers
                .get(CSRF_HEADER)
                .and_then(|v| v.to_str().ok())
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        })
}
