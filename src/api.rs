//! Unified API router for Easel
//!
//! Merges all module routers into a single axum `Router` with CORS and
//! request tracing, and maps crate errors onto JSON error responses.
//!
//! ## Endpoint Map
//!
//! | Path             | Module    | Description                          |
//! |------------------|-----------|--------------------------------------|
//! | `/health`        | api       | Liveness probe                       |
//! | `/api/csrf`      | security  | Issue the session CSRF token         |
//! | `/api/login`     | security  | Artist login                         |
//! | `/api/logout`    | security  | End the session                      |
//! | `/api/artworks`  | artworks  | Uploaded artworks with thumbnails    |
//! | `/api/exhibits`  | exhibits  | Exhibit list/create/update/delete/reorder |
//!
//! Every error body has the shape `{"error": "<message>"}`.

use crate::artworks::{artworks_router, ArtworksState};
use crate::error::Error;
use crate::exhibits::{exhibits_router, ExhibitsState};
use crate::security::{auth_router, AuthState};
use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the complete Easel HTTP application
pub fn build_app(
    auth_state: AuthState,
    artworks_state: ArtworksState,
    exhibits_state: ExhibitsState,
    cors_origins: &[String],
) -> Router {
    let cors = build_cors(cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .merge(auth_router(auth_state))
        .merge(artworks_router(artworks_state))
        .merge(exhibits_router(exhibits_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

// =============================================================================
// Error responses
// =============================================================================

/// JSON error response
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Unauthenticated => Self::new(StatusCode::UNAUTHORIZED, err.to_string()),
            Error::Forbidden(message) => Self::new(StatusCode::FORBIDDEN, message),
            Error::RateLimited(_) => Self::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Too many requests. Please try again later.",
            ),
            Error::MethodNotAllowed => Self::new(StatusCode::METHOD_NOT_ALLOWED, err.to_string()),
            Error::Validation(message) => Self::new(StatusCode::BAD_REQUEST, message),
            Error::NotFound(message) => Self::new(StatusCode::NOT_FOUND, message),
            Error::Io(_) | Error::Serialization(_) => {
                tracing::error!("Storage failure: {}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save")
            }
            Error::CorruptStore(_) => {
                tracing::error!("{}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Stored data is unreadable")
            }
            Error::Config(_) | Error::Crypto(_) => {
                tracing::error!("{}", err);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "Server misconfigured")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: &self.message,
            }),
        )
            .into_response()
    }
}

// =============================================================================
// Root handlers
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// =============================================================================
// CORS
// =============================================================================

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(crate::security::csrf::CSRF_HEADER),
        ]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<_> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        cors.allow_origin(parsed).allow_credentials(true)
    }
}
