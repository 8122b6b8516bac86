//! Session-scoped fixed-window rate limiting
//!
//! Counts reset when `floor(now / window_seconds)` changes. A client can
//! burst up to `2 * max` attempts across a window boundary; that is a
//! property of the fixed-window scheme.

use crate::config::RateLimitConfig;
use crate::error::{Error, Result};
use crate::session::{RateWindow, Session};

/// Check the limit for `key` and count one attempt if allowed
pub fn check_and_increment(
    session: &mut Session,
    key: &str,
    max: u32,
    window_seconds: u64,
) -> Result<()> {
    check_and_increment_at(session, key, max, window_seconds, chrono::Utc::now().timestamp())
}

/// Same as [`check_and_increment`] with an explicit clock (unix seconds)
pub fn check_and_increment_at(
    session: &mut Session,
    key: &str,
    max: u32,
    window_seconds: u64,
    now: i64,
) -> Result<()> {
    let window_seconds = window_seconds.max(1) as i64;
    let current_window = now.div_euclid(window_seconds);

    let state = session
        .rate_limits
        .entry(key.to_string())
        .or_insert(RateWindow {
            window: current_window,
            count: 0,
        });

    if state.window != current_window {
        *state = RateWindow {
            window: current_window,
            count: 0,
        };
    }

    if state.count >= max {
        tracing::warn!(key, max, "Rate limit exceeded");
        return Err(Error::RateLimited(key.to_string()));
    }

    state.count += 1;
    Ok(())
}

/// A named limit bound to its configuration
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    key: &'static str,
    config: RateLimitConfig,
}

impl RateLimit {
    pub fn new(key: &'static str, config: RateLimitConfig) -> Self {
        Self { key, config }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Count one attempt against the session
    pub fn check(&self, session: &mut Session) -> Result<()> {
        check_and_increment(session, self.key, self.config.max, self.config.window_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fourth_call_in_window_rejected() {
        let mut session = Session::default();
        let now = 1_700_000_000;
        assert!(check_and_increment_at(&mut session, "login", 3, 60, now).is_ok());
        assert!(check_and_increment_at(&mut session, "login", 3, 60, now + 1).is_ok());
        assert!(check_and_increment_at(&mut session, "login", 3, 60, now + 2).is_ok());
        let result = check_and_increment_at(&mut session, "login", 3, 60, now + 3);
        assert!(matches!(result, Err(Error::RateLimited(_))));
    }

    #[test]
    fn test_rejection_does_not_increment() {
        let mut session = Session::default();
        let now = 600;
        for _ in 0..2 {
            check_and_increment_at(&mut session, "k", 2, 60, now).unwrap();
        }
        assert!(check_and_increment_at(&mut session, "k", 2, 60, now).is_err());
        assert!(check_and_increment_at(&mut session, "k", 2, 60, now).is_err());
        assert_eq!(session.rate_limits["k"].count, 2);
    }

    #[test]
    fn test_fresh_window_resets_count() {
        let mut session = Session::default();
        let now = 1_700_000_000 - (1_700_000_000 % 60);
        for _ in 0..3 {
            check_and_increment_at(&mut session, "login", 3, 60, now).unwrap();
        }
        assert!(check_and_increment_at(&mut session, "login", 3, 60, now + 59).is_err());

        assert!(check_and_increment_at(&mut session, "login", 3, 60, now + 60).is_ok());
        assert_eq!(session.rate_limits["login"].count, 1);
        assert_eq!(session.rate_limits["login"].window, (now + 60) / 60);
    }

    #[test]
    fn test_burst_across_boundary() {
        let mut session = Session::default();
        let boundary = 120;
        for _ in 0..3 {
            check_and_increment_at(&mut session, "k", 3, 60, boundary - 1).unwrap();
        }
        for _ in 0..3 {
            check_and_increment_at(&mut session, "k", 3, 60, boundary).unwrap();
        }
    }

    #[test]
    fn test_keys_are_independent() {
        let mut session = Session::default();
        check_and_increment_at(&mut session, "a", 1, 60, 0).unwrap();
        assert!(check_and_increment_at(&mut session, "a", 1, 60, 0).is_err());
        assert!(check_and_increment_at(&mut session, "b", 1, 60, 0).is_ok());
    }

    #[test]
    fn test_zero_max_always_rejects() {
        let mut session = Session::default();
        assert!(check_and_increment_at(&mut session, "k", 0, 60, 0).is_err());
    }

    #[test]
    fn test_rate_limit_wrapper() {
        let limit = RateLimit::new(
            "login",
            RateLimitConfig {
                max: 1,
                window_seconds: 3600,
            },
        );
        let mut session = Session::default();
        assert_eq!(limit.key(), "login");
        assert!(limit.check(&mut session).is_ok());
        assert!(limit.check(&mut session).is_err());
    }
}
