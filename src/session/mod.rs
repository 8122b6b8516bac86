//! Browser sessions: cookie handling and the in-process session store

pub mod cookie;
mod store;

pub use cookie::{session_id_from_headers, SESSION_COOKIE};
pub use store::{new_session_id, RateWindow, ResolvedSession, Session, SessionStore};
