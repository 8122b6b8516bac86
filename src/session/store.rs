//! In-process session store
//!
//! Each browser is identified by an opaque session id delivered in a cookie.
//! Handlers read a snapshot with `resolve` for checks that do not change
//! state. Every change goes through `update` or `rotate`, which run under
//! the store's write lock against the live entry, so a session removed by a
//! concurrent logout stays removed and counters are never lost.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Fixed-window counter state for one rate-limit key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateWindow {
    /// Window index (`floor(now / window_seconds)`)
    pub window: i64,
    /// Attempts counted in that window
    pub count: u32,
}

/// Per-browser session state
#[derive(Debug, Clone, Default)]
pub struct Session {
    /// Whether the artist has logged in on this session
    pub authenticated: bool,
    /// Hex-encoded CSRF token, issued lazily
    pub csrf_token: Option<String>,
    /// Rate-limit counters keyed by limiter name
    pub rate_limits: HashMap<String, RateWindow>,
    /// Unix seconds of the last request that touched the session
    pub last_seen: i64,
}

/// A session snapshot bound to the id it was resolved under
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    pub id: String,
    pub session: Session,
    /// True when no stored session matched the request cookie
    pub is_new: bool,
}

/// Session store keyed by session id
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of a stored session
    pub async fn get(&self, id: &str) -> Option<Session> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Resolve the session for a (possibly absent) cookie value.
    ///
    /// Unknown ids are never adopted: a fresh id is minted instead so a
    /// client cannot choose its own session id. A fresh session is not
    /// stored until `insert` is called.
    pub async fn resolve(&self, cookie_id: Option<&str>) -> ResolvedSession {
        if let Some(id) = cookie_id {
            let mut sessions = self.sessions.write().await;
            if let Some(session) = sessions.get_mut(id) {
                session.last_seen = now();
                return ResolvedSession {
                    id: id.to_string(),
                    session: session.clone(),
                    is_new: false,
                };
            }
        }
        ResolvedSession {
            id: new_session_id(),
            session: Session {
                last_seen: now(),
                ..Default::default()
            },
            is_new: true,
        }
    }

    /// Store a freshly minted session
    pub async fn insert(&self, resolved: &ResolvedSession) {
        self.sessions
            .write()
            .await
            .insert(resolved.id.clone(), resolved.session.clone());
    }

    /// Apply `f` to the stored session under the write lock.
    ///
    /// Returns `None` when the session no longer exists.
    pub async fn update<R, F>(&self, id: &str, f: F) -> Option<R>
    where
        F: FnOnce(&mut Session) -> R,
    {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(id)?;
        session.last_seen = now();
        Some(f(session))
    }

    /// Move a session to a new id, applying `f` on the way.
    ///
    /// The old id stops resolving in the same critical section. Returns the
    /// new id, or `None` when the session no longer exists.
    pub async fn rotate<F>(&self, id: &str, f: F) -> Option<String>
    where
        F: FnOnce(&mut Session),
    {
        let mut sessions = self.sessions.write().await;
        let mut session = sessions.remove(id)?;
        session.last_seen = now();
        f(&mut session);
        let new_id = new_session_id();
        sessions.insert(new_id.clone(), session);
        Some(new_id)
    }

    /// Drop a session, returning it if it existed
    pub async fn remove(&self, id: &str) -> Option<Session> {
        self.sessions.write().await.remove(id)
    }

    /// Drop sessions idle for longer than `max_idle_secs`
    pub async fn cleanup_idle(&self, max_idle_secs: i64) -> usize {
        self.cleanup_idle_at(max_idle_secs, now()).await
    }

    /// Same as [`cleanup_idle`](Self::cleanup_idle) with an explicit clock
    pub async fn cleanup_idle_at(&self, max_idle_secs: i64, now: i64) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| now - session.last_seen <= max_idle_secs);
        let cleaned = before - sessions.len();

        if cleaned > 0 {
            tracing::info!("Cleaned up {} idle sessions", cleaned);
        }
        cleaned
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Generate a new random session id
pub fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}
