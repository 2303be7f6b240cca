//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::{health, parse};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Create API v1 routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/parse", post(parse::parse_handler))
        .route("/classify", post(parse::classify_handler))
}

/// Probes and the unversioned parse endpoint existing clients call
pub fn root_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .route("/parse", post(parse::parse_handler))
}
