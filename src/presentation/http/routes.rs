//! Route Configuration
//!
//! The REST administrative surface lives in a separate service; this
//! process only exposes the chat endpoint and a health probe.

use axum::{routing::get, Router};

use super::handlers;
use crate::presentation::websocket::ws_handler;
use crate::startup::AppState;

/// Create the main router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // WebSocket chat endpoint; chatId and token ride on the query string
        .route("/ws", get(ws_handler))
        // Health check endpoint
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
}
