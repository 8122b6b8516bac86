//! Security gate — CSRF tokens, rate limiting, and artist login
//!
//! Every function takes the caller's `Session` explicitly; nothing here
//! reaches for ambient request state.

pub mod csrf;
pub mod handler;
pub mod password;
pub mod rate_limit;

pub use handler::{auth_router, AuthState};
pub use rate_limit::RateLimit;

/// Hex-encode bytes to lowercase hex string.
pub fn hex_encode(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Constant-time byte comparison
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    ring::constant_time::verify_slices_are_equal(a, b).is_ok()
}
