//! HTTP handlers for the artist session
//!
//! Provides 3 endpoints:
//! - GET  /api/csrf    — issue the session CSRF token
//! - POST /api/login   — authenticate with the artist password
//! - POST /api/logout  — end the session
//!
//! Login and logout accept JSON or form-encoded bodies.

use crate::api::ApiError;
use crate::body::{read_fields, str_field};
use crate::config::AuthConfig;
use crate::error::Error;
use crate::security::csrf::{self, CSRF_FIELD};
use crate::security::password::verify_password;
use crate::security::RateLimit;
use crate::session::cookie::{clear_session_cookie, session_cookie};
use crate::session::{session_id_from_headers, SessionStore};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

/// Shared state for session handlers
#[derive(Clone)]
pub struct AuthState {
    pub sessions: SessionStore,
    pub auth: AuthConfig,
    pub login_limit: RateLimit,
    pub secure_cookie: bool,
}

/// Create the session router
pub fn auth_router(state: AuthState) -> Router {
    Router::new()
        .route("/api/csrf", get(get_csrf_token))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .with_state(state)
}

fn with_cookie(mut response: Response, cookie: Option<HeaderValue>) -> Response {
    if let Some(value) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    response
}

fn invalid_csrf() -> Error {
    Error::Forbidden("Invalid CSRF token".to_string())
}

/// GET /api/csrf
async fn get_csrf_token(State(state): State<AuthState>, headers: HeaderMap) -> Response {
    let cookie = session_id_from_headers(&headers);
    let mut resolved = state.sessions.resolve(cookie.as_deref()).await;

    if !resolved.is_new {
        if let Some(token) = state.sessions.update(&resolved.id, csrf::issue_token).await {
            return Json(json!({ "csrf_token": token })).into_response();
        }
        // Removed since resolve; start over with a fresh session
        resolved = state.sessions.resolve(None).await;
    }

    let token = csrf::issue_token(&mut resolved.session);
    state.sessions.insert(&resolved).await;
    with_cookie(
        Json(json!({ "csrf_token": token })).into_response(),
        session_cookie(&resolved.id, state.secure_cookie),
    )
}

/// POST /api/login
async fn login(
    State(state): State<AuthState>,
    headers: HeaderMap,
    request: Request,
) -> Result<Response, ApiError> {
    let fields = read_fields(&headers, request).await;

    let cookie = session_id_from_headers(&headers);
    let resolved = state.sessions.resolve(cookie.as_deref()).await;

    let supplied = csrf::supplied_token(str_field(&fields, CSRF_FIELD), &headers);
    csrf::verify(&resolved.session, supplied.as_deref())?;

    state
        .sessions
        .update(&resolved.id, |session| state.login_limit.check(session))
        .await
        .ok_or_else(invalid_csrf)??;

    let password = str_field(&fields, "password").unwrap_or("").to_string();
    let phc = state.auth.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &phc))
        .await
        .unwrap_or(false);

    if !valid {
        tracing::warn!(session = %resolved.id, "Failed login attempt");
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid password"));
    }

    // Fresh id on privilege change
    let new_id = state
        .sessions
        .rotate(&resolved.id, |session| session.authenticated = true)
        .await
        .ok_or_else(invalid_csrf)?;
    tracing::info!("Artist logged in");

    Ok(with_cookie(
        Json(json!({ "success": true })).into_response(),
        session_cookie(&new_id, state.secure_cookie),
    ))
}

/// POST /api/logout
async fn logout(
    State(state): State<AuthState>,
    headers: HeaderMap,
    request: Request,
) -> Result<Response, ApiError> {
    let fields = read_fields(&headers, request).await;

    let cookie = session_id_from_headers(&headers);
    let resolved = state.sessions.resolve(cookie.as_deref()).await;
    if resolved.is_new {
        return Err(invalid_csrf().into());
    }

    let supplied = csrf::supplied_token(str_field(&fields, CSRF_FIELD), &headers);
    csrf::verify(&resolved.session, supplied.as_deref())?;

    state.sessions.remove(&resolved.id).await;
    tracing::info!("Session ended");

    Ok(with_cookie(
        Json(json!({ "success": true })).into_response(),
        clear_session_cookie(state.secure_cookie),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RateLimitConfig;
    use crate::security::password::hash_password;
    use axum::body::Body;
    use std::sync::OnceLock;
    use tower::ServiceExt;

    fn password_hash() -> String {
        static HASH: OnceLock<String> = OnceLock::new();
        HASH.get_or_init(|| hash_password("correct horse").unwrap())
            .clone()
    }

    fn make_state(max_logins: u32) -> AuthState {
        AuthState {
            sessions: SessionStore::new(),
            auth: AuthConfig {
                password_hash: password_hash(),
            },
            login_limit: RateLimit::new(
                "login",
                RateLimitConfig {
                    max: max_logins,
                    window_seconds: 900,
                },
            ),
            secure_cookie: false,
        }
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), 1024 * 64)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn set_cookie_id(response: &Response) -> String {
        let value = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        value
            .split(';')
            .next()
            .unwrap()
            .trim_start_matches("easel_session=")
            .to_string()
    }

    /// Fetch a CSRF token, returning (session id, token)
    async fn start_session(app: &Router) -> (String, String) {
        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/csrf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let sid = set_cookie_id(&resp);
        let token = body_json(resp).await["csrf_token"]
            .as_str()
            .unwrap()
            .to_string();
        (sid, token)
    }

    async fn post(app: &Router, uri: &str, sid: &str, body: serde_json::Value) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("cookie", format!("easel_session={}", sid))
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_csrf_token_is_stable_per_session() {
        let state = make_state(5);
        let app = auth_router(state.clone());
        let (sid, token) = start_session(&app).await;
        assert_eq!(token.len(), 64);

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/csrf")
                    .header("cookie", format!("easel_session={}", sid))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(resp.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(resp).await["csrf_token"], token.as_str());
    }

    #[tokio::test]
    async fn test_session_cookie_attributes() {
        let app = auth_router(make_state(5));
        let resp = app
            .oneshot(
                Request::builder()
                    .uri("/api/csrf")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(!cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_login_success_rotates_session() {
        let state = make_state(5);
        let app = auth_router(state.clone());
        let (sid, token) = start_session(&app).await;

        let resp = post(
            &app,
            "/api/login",
            &sid,
            json!({"password": "correct horse", "csrf_token": token}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        let new_sid = set_cookie_id(&resp);
        assert_ne!(new_sid, sid);
        assert_eq!(body_json(resp).await, json!({"success": true}));

        assert!(state.sessions.get(&sid).await.is_none());
        let session = state.sessions.get(&new_sid).await.unwrap();
        assert!(session.authenticated);
        assert_eq!(session.csrf_token.as_deref(), Some(token.as_str()));
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let state = make_state(5);
        let app = auth_router(state.clone());
        let (sid, token) = start_session(&app).await;

        let resp = post(
            &app,
            "/api/login",
            &sid,
            json!({"password": "wrong", "csrf_token": token}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(resp).await["error"], "Invalid password");
        assert!(!state.sessions.get(&sid).await.unwrap().authenticated);
    }

    #[tokio::test]
    async fn test_login_requires_csrf() {
        let state = make_state(5);
        let app = auth_router(state.clone());
        let (sid, _token) = start_session(&app).await;

        let resp = post(&app, "/api/login", &sid, json!({"password": "correct horse"})).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(!state.sessions.get(&sid).await.unwrap().authenticated);
    }

    #[tokio::test]
    async fn test_login_rate_limited() {
        let app = auth_router(make_state(2));
        let (sid, token) = start_session(&app).await;

        for _ in 0..2 {
            let resp = post(
                &app,
                "/api/login",
                &sid,
                json!({"password": "nope", "csrf_token": token}),
            )
            .await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        }

        // Even the right password is refused once the window is exhausted
        let resp = post(
            &app,
            "/api/login",
            &sid,
            json!({"password": "correct horse", "csrf_token": token}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_login_with_form_body() {
        let state = make_state(5);
        let app = auth_router(state.clone());
        let (sid, token) = start_session(&app).await;

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/login")
                    .header("cookie", format!("easel_session={}", sid))
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from(format!(
                        "password=correct+horse&csrf_token={}",
                        token
                    )))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let new_sid = set_cookie_id(&resp);
        assert!(state.sessions.get(&new_sid).await.unwrap().authenticated);
    }

    #[tokio::test]
    async fn test_concurrent_logins_respect_limit() {
        let app = auth_router(make_state(5));
        let (sid, token) = start_session(&app).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let app = app.clone();
            let sid = sid.clone();
            let token = token.clone();
            handles.push(tokio::spawn(async move {
                post(
                    &app,
                    "/api/login",
                    &sid,
                    json!({"password": "nope", "csrf_token": token}),
                )
                .await
                .status()
            }));
        }

        let mut unauthorized = 0;
        let mut limited = 0;
        for handle in handles {
            match handle.await.unwrap() {
                StatusCode::UNAUTHORIZED => unauthorized += 1,
                StatusCode::TOO_MANY_REQUESTS => limited += 1,
                other => panic!("unexpected status {}", other),
            }
        }
        assert_eq!(unauthorized, 5);
        assert_eq!(limited, 5);
    }

    #[tokio::test]
    async fn test_anonymous_csrf_sessions_are_swept() {
        let state = make_state(5);
        let app = auth_router(state.clone());
        for _ in 0..20 {
            start_session(&app).await;
        }
        assert_eq!(state.sessions.len().await, 20);

        let later = chrono::Utc::now().timestamp() + 7201;
        assert_eq!(state.sessions.cleanup_idle_at(7200, later).await, 20);
        assert!(state.sessions.is_empty().await);
    }

    #[tokio::test]
    async fn test_login_disabled_without_digest() {
        let mut state = make_state(5);
        state.auth.password_hash = String::new();
        let app = auth_router(state);
        let (sid, token) = start_session(&app).await;

        let resp = post(
            &app,
            "/api/login",
            &sid,
            json!({"password": "", "csrf_token": token}),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout() {
        let state = make_state(5);
        let app = auth_router(state.clone());
        let (sid, token) = start_session(&app).await;

        let resp = post(&app, "/api/logout", &sid, json!({})).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(state.sessions.get(&sid).await.is_some());

        let resp = post(&app, "/api/logout", &sid, json!({"csrf_token": token})).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970"));
        assert!(state.sessions.get(&sid).await.is_none());
    }

    #[tokio::test]
    async fn test_logout_without_session() {
        let app = auth_router(make_state(5));
        let resp = post(&app, "/api/logout", "unknown", json!({"csrf_token": "x"})).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
}
