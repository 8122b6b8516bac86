//! HTTP handler for the Exhibits API
//!
//! A single action-dispatched endpoint:
//! - POST /api/exhibits — `action` ∈ {list, create, update, delete, reorder}
//!
//! Bodies may be JSON or form-encoded (`key[]` form fields become arrays).
//! Checks run in order: session authenticated, method is POST, CSRF token,
//! action name, write rate limit for mutating actions.

use crate::api::ApiError;
use crate::body::{read_fields, str_field, Fields};
use crate::error::{Error, Result};
use crate::exhibits::service::ExhibitService;
use crate::exhibits::types::*;
use crate::security::csrf::{self, CSRF_FIELD};
use crate::security::RateLimit;
use crate::session::{session_id_from_headers, SessionStore};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    routing::any,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared state for the exhibits handler
#[derive(Clone)]
pub struct ExhibitsState {
    pub sessions: SessionStore,
    pub service: Arc<ExhibitService>,
    pub write_limit: RateLimit,
}

/// Create the exhibits router
pub fn exhibits_router(state: ExhibitsState) -> Router {
    Router::new()
        .route("/api/exhibits", any(exhibits_endpoint))
        .with_state(state)
}

/// POST /api/exhibits
async fn exhibits_endpoint(
    State(state): State<ExhibitsState>,
    method: Method,
    headers: HeaderMap,
    request: Request,
) -> std::result::Result<Json<Value>, ApiError> {
    let cookie = session_id_from_headers(&headers);
    let resolved = state.sessions.resolve(cookie.as_deref()).await;
    if !resolved.session.authenticated {
        return Err(Error::Unauthenticated.into());
    }

    if method != Method::POST {
        return Err(Error::MethodNotAllowed.into());
    }

    let input = read_fields(&headers, request).await;

    let supplied = csrf::supplied_token(str_field(&input, CSRF_FIELD), &headers);
    if let Err(e) = csrf::verify(&resolved.session, supplied.as_deref()) {
        tracing::warn!(session = %resolved.id, "Rejected exhibit request: invalid CSRF token");
        return Err(e.into());
    }

    let action: ExhibitAction = str_field(&input, "action").unwrap_or("").parse()?;

    if action.is_mutating() {
        // Counted against the live session; a concurrent logout wins
        state
            .sessions
            .update(&resolved.id, |session| {
                if !session.authenticated {
                    return Err(Error::Unauthenticated);
                }
                state.write_limit.check(session)
            })
            .await
            .unwrap_or(Err(Error::Unauthenticated))?;
    }

    tracing::debug!(%action, "Dispatching exhibit action");
    let body = dispatch(&state.service, action, input).await?;
    Ok(Json(body))
}

async fn dispatch(service: &ExhibitService, action: ExhibitAction, input: Fields) -> Result<Value> {
    match action {
        ExhibitAction::List => {
            let exhibits = service.list().await?;
            Ok(json!({ "success": true, "exhibits": exhibits }))
        }
        ExhibitAction::Create => {
            let request: NewExhibit = decode(input)?;
            let (slug, exhibit) = service.create(request).await?;
            Ok(json!({ "success": true, "slug": slug, "exhibit": exhibit }))
        }
        ExhibitAction::Update => {
            let slug = slug_of(&input);
            let patch: ExhibitPatch = decode(input)?;
            let exhibit = service.update(&slug, patch).await?;
            Ok(json!({ "success": true, "slug": slug, "exhibit": exhibit }))
        }
        ExhibitAction::Delete => {
            service.delete(&slug_of(&input)).await?;
            Ok(json!({ "success": true }))
        }
        ExhibitAction::Reorder => {
            let slug = slug_of(&input);
            let raw = input.get("artworks").cloned();
            service
                .reorder_with(&slug, move || artwork_list(raw.as_ref()))
                .await?;
            Ok(json!({ "success": true }))
        }
    }
}

fn slug_of(input: &Fields) -> String {
    str_field(input, "slug").unwrap_or("").to_string()
}

fn decode<T: serde::de::DeserializeOwned>(input: Fields) -> Result<T> {
    serde_json::from_value(Value::Object(input))
        .map_err(|e| Error::Validation(format!("Invalid exhibit fields: {}", e)))
}

/// Artwork identifiers for `reorder`; absent or null means an empty list
fn artwork_list(value: Option<&Value>) -> Result<Vec<String>> {
    match value {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::Validation("artworks must be an array of strings".to_string())
                })
            })
            .collect(),
        Some(_) => Err(Error::Validation("artworks must be an array".to_string())),
    }
}
