//! HTTP handler for liveness and metrics
//!
//! Served only when a metrics address is configured.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::telemetry::BotMetrics;

/// Application state
pub struct AppState {
    pub metrics: Arc<BotMetrics>,
}

impl AppState {
    pub fn new(metrics: Arc<BotMetrics>) -> Self {
        Self { metrics }
    }
}

/// Create the router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Prometheus scrape endpoint
async fn metrics(State(state): State<Arc<AppState>>) -> Result<String, (StatusCode, String)> {
    state
        .metrics
        .encode_text()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
