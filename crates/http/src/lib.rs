//! HTTP API server for the datalens gateway.

pub mod api_error;
mod handlers;

use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use datalens_service::ChatService;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub chat: Arc<ChatService>,
}

/// Build the gateway router: chat endpoints, health, and static serving of
/// rendered chart descriptors.
pub fn create_router(state: Arc<AppState>, charts_dir: PathBuf) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/chat/ask", post(handlers::ask))
        .route(
            "/chat/history/{session_id}",
            get(handlers::history).delete(handlers::clear_history),
        )
        .route("/chat/stats", get(handlers::stats))
        .route("/chat/suggest", get(handlers::suggest))
        .nest_service("/charts", ServeDir::new(charts_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
