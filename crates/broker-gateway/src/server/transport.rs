//! HTTP transport: shared state and route table.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::get,
};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::client::BrokerClient;
use crate::session::SessionStore;

/// Shared state for HTTP handlers.
#[derive(Debug)]
pub struct HttpState {
    pub broker: BrokerClient,
    pub sessions: SessionStore,
}

/// Create the HTTP router.
///
/// `sessions` is a shared handle; callers may keep a clone to observe what
/// the token callback stores.
pub fn create_router(broker: BrokerClient, sessions: SessionStore) -> Router {
    let state = Arc::new(HttpState { broker, sessions });

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/api/v1/login", get(handlers::handle_login))
        .route("/api/v1/token", get(handlers::handle_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "broker-gateway",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn readiness_check(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ready",
        "service": "broker-gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.sessions.len()
    }))
}
