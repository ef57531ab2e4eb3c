//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;
use crate::config::normalize_prefix;

/// Create the application router, mounting the post routes under `api_prefix`.
///
/// An empty prefix (or `/`) mounts them at the root.
pub fn create_router(state: AppState, api_prefix: &str) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route(
            "/posts",
            get(handlers::list_posts).post(handlers::create_post),
        )
        .route(
            "/posts/{id}",
            get(handlers::get_post)
                .put(handlers::update_post)
                .delete(handlers::delete_post),
        )
        .route(
            "/posts/{id}/comments",
            get(handlers::list_post_comments).post(handlers::create_comment),
        );

    let service = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check));

    let prefix = normalize_prefix(api_prefix);
    let app = if prefix.is_empty() {
        service.merge(api)
    } else {
        service.nest(&prefix, api)
    };

    app.fallback(handlers::not_found)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
