//! API route definitions

use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Dialogue sessions
        .route("/sessions", post(handlers::start_session))
        .route("/sessions/:id/messages", post(handlers::submit_message))
        .route("/sessions/:id/profile", get(handlers::get_profile))
        .route("/sessions/:id", delete(handlers::delete_session))
        // Knowledge base
        .route("/kb/search", post(handlers::kb_search))
        // Form extraction
        .route("/forms/extract", post(handlers::extract_form))
        .with_state(state)
}
