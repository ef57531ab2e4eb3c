//! HTTP handlers for the REST API.
//!
//! Each handler collects its extractors into an [`ApiRequest`], delegates to
//! the matching function in [`crate::routes::posts`], and renders the
//! [`ApiResponse`] it gets back.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, Path, Query, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use log::debug;
use serde_json::{Map, Value};

use super::dto::HealthResponse;
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::routes::{posts, ApiRequest, ApiResponse};

/// Result type for adapters that read a request body.
pub type HandlerResult = Result<ApiResponse, AppError>;

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        match self.body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        }
    }
}

/// Whether the request declares a JSON body (`application/json` or `*/*+json`).
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Decode a request body.
///
/// Only JSON bodies are read; an empty body or any other content type is an
/// empty object, which field validation then rejects.
pub fn parse_body(headers: &HeaderMap, bytes: &[u8]) -> Result<Value, AppError> {
    if !is_json(headers) || bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    Ok(serde_json::from_slice(bytes)?)
}

/// Build a request around the `id` path segment.
///
/// A segment axum cannot decode (e.g. invalid UTF-8) becomes an empty id,
/// which no stored post can have.
fn with_id(id: Result<Path<String>, PathRejection>) -> ApiRequest {
    let id = match id {
        Ok(Path(id)) => id,
        Err(rejection) => {
            debug!("Undecodable post id: {}", rejection.body_text());
            String::new()
        }
    };
    ApiRequest::new().with_param("id", id)
}

// =============================================================================
// Service
// =============================================================================

/// GET /
pub async fn root() -> Html<&'static str> {
    Html("<h1>Server is up and running</h1>")
}

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is reachable.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: db_status,
    })
}

/// Fallback for unmatched paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

// =============================================================================
// Posts
// =============================================================================

/// GET /posts
pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<BTreeMap<String, String>>,
) -> ApiResponse {
    let request = ApiRequest::new().with_query(query);
    posts::list_posts(state.repository.as_ref(), &request).await
}

/// GET /posts/{id}
pub async fn get_post(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResponse {
    posts::get_post(state.repository.as_ref(), &with_id(id)).await
}

/// POST /posts
pub async fn create_post(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> HandlerResult {
    let request = ApiRequest::new().with_body(parse_body(&headers, &body)?);
    Ok(posts::create_post(state.repository.as_ref(), &request).await)
}

/// PUT /posts/{id}
pub async fn update_post(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> HandlerResult {
    let request = with_id(id).with_body(parse_body(&headers, &body)?);
    Ok(posts::update_post(state.repository.as_ref(), &request).await)
}

/// DELETE /posts/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResponse {
    posts::delete_post(state.repository.as_ref(), &with_id(id)).await
}

// =============================================================================
// Comments
// =============================================================================

/// GET /posts/{id}/comments
pub async fn list_post_comments(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResponse {
    posts::list_post_comments(state.repository.as_ref(), &with_id(id)).await
}

/// POST /posts/{id}/comments
pub async fn create_comment(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    headers: HeaderMap,
    body: Bytes,
) -> HandlerResult {
    let request = with_id(id).with_body(parse_body(&headers, &body)?);
    Ok(posts::create_comment(state.repository.as_ref(), &request).await)
}
