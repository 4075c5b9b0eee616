//! Route table and middleware stack.

use crate::handlers;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Per-file Pinata cap is 25 MiB on the free tier; allow a small batch.
const MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Build the gateway router with all routes and middleware.
pub fn create(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route(
            "/api/files",
            post(handlers::upload_files).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/collections", post(handlers::build_create_collection))
        .route("/api/collections/total", get(handlers::total_collections))
        .route("/api/collections/{id}", get(handlers::get_collection))
        .route("/api/collections/{id}/mint", post(handlers::build_mint))
        .route(
            "/api/collections/{id}/tokens/total",
            get(handlers::total_tokens),
        )
        .route(
            "/api/collections/{id}/tokens/{token_id}",
            get(handlers::get_token),
        )
        .route(
            "/api/collections/{id}/tokens/{token_id}/owner",
            get(handlers::owner_of),
        )
        .route("/api/transfers", post(handlers::build_transfer))
        .route("/api/transactions", post(handlers::submit_transaction))
        .route("/api/accounts/{address}/tokens", get(handlers::tokens_of))
        .layer(axum::middleware::from_fn(
            crate::middleware::inject_request_id,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
