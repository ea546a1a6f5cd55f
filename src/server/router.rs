use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::handlers::{chat, documents, health, sessions};
use crate::state::AppState;

/// Creates the application router with all routes and middleware.
///
/// The routes are the caller-facing API: document ingestion, question
/// answering, and session inspection. Any UI sits on the other side of
/// this boundary.
pub fn router(state: Arc<AppState>) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/documents", post(documents::ingest_document))
        .route("/api/chat", post(chat::ask))
        .route("/api/session", get(sessions::get_session))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}
