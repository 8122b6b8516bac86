//! Request body decoding shared by the form-friendly endpoints
//!
//! `application/json` bodies must be an object; everything else is read as
//! `application/x-www-form-urlencoded`, where repeated `key[]` fields
//! accumulate into an array under `key`. Unreadable bodies yield an empty
//! map so that the caller's own checks (CSRF, required fields) reject them.

use axum::{
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
    Form, Json,
};
use serde_json::{Map, Value};

/// Field map of a request body
pub type Fields = Map<String, Value>;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|ct| ct.contains("application/json"))
        .unwrap_or(false)
}

/// Read the request body as a field map
pub async fn read_fields(headers: &HeaderMap, request: Request) -> Fields {
    if is_json(headers) {
        match Json::<Value>::from_request(request, &()).await {
            Ok(Json(Value::Object(map))) => map,
            _ => Map::new(),
        }
    } else {
        match Form::<Vec<(String, String)>>::from_request(request, &()).await {
            Ok(Form(pairs)) => form_to_map(pairs),
            Err(_) => Map::new(),
        }
    }
}

/// String value of a field, if present and a string
pub fn str_field<'a>(fields: &'a Fields, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

/// Fold form pairs into a map; `key[]` entries accumulate into arrays
fn form_to_map(pairs: Vec<(String, String)>) -> Fields {
    let mut map = Map::new();
    for (key, value) in pairs {
        match key.strip_suffix("[]") {
            Some(base) => {
                let entry = map
                    .entry(base.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()));
                match entry {
                    Value::Array(items) => items.push(Value::String(value)),
                    other => *other = Value::Array(vec![Value::String(value)]),
                }
            }
            None => {
                map.insert(key, Value::String(value));
            }
        }
    }
    map
}
