pub mod config;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod origin;
pub mod rate_limit;
pub mod state;

use axum::{
    Router,
    routing::{any, get},
};
use std::sync::Arc;

// Router construction lives in the library so integration tests can drive
// the app without binding a socket
pub fn router(state: Arc<state::AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/chat", any(handlers::chat_handler))
        .with_state(state)
}
