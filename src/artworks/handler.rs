//! HTTP handler for the Artworks API
//!
//! - GET /api/artworks — originals with thumbnail URLs and titles

use crate::api::ApiError;
use crate::artworks::lister::ArtworkLister;
use crate::artworks::types::ArtworkEntry;
use crate::session::{session_id_from_headers, SessionStore};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

/// Shared state for the artworks handler
#[derive(Clone)]
pub struct ArtworksState {
    pub sessions: SessionStore,
    pub lister: Arc<ArtworkLister>,
}

/// Create the artworks router
pub fn artworks_router(state: ArtworksState) -> Router {
    Router::new()
        .route("/api/artworks", get(list_artworks))
        .with_state(state)
}

#[derive(Serialize)]
struct ArtworksResponse {
    artworks: Vec<ArtworkEntry>,
}

/// GET /api/artworks
async fn list_artworks(
    State(state): State<ArtworksState>,
    headers: HeaderMap,
) -> Result<Json<ArtworksResponse>, ApiError> {
    let authenticated = match session_id_from_headers(&headers) {
        Some(id) => state
            .sessions
            .get(&id)
            .await
            .map(|s| s.authenticated)
            .unwrap_or(false),
        None => false,
    };
    if !authenticated {
        return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Auth required"));
    }

    let artworks = state.lister.list().await?;
    Ok(Json(ArtworksResponse { artworks }))
}
