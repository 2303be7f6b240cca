//! jobmail API - HTTP server
//!
//! Exposes the extraction pipeline over HTTP, with OpenAPI docs at
//! `/api-docs/openapi.json` and Swagger UI at `/swagger-ui`.
//!
//! Author: hephaex@gmail.com

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, http::HeaderValue, Router};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;
use jobmail_core::config::ServerConfig;

/// OpenAPI document
#[derive(OpenApi)]
#[openapi(
    info(
        title = "jobmail API",
        description = "Extracts company, position and confidence from job-application emails"
    ),
    paths(
        handlers::parse::parse_handler,
        handlers::parse::classify_handler,
        handlers::health::health_check,
        handlers::health::readiness_check,
        handlers::health::metrics,
    ),
    components(schemas(
        handlers::parse::ParseRequest,
        handlers::parse::ParseResponse,
        handlers::parse::ClassifyRequest,
        handlers::parse::ClassifyResponse,
        handlers::health::HealthResponse,
        handlers::health::ReadinessResponse,
        handlers::health::ReadinessChecks,
        handlers::health::MetricsResponse,
        error::ApiError,
    )),
    tags(
        (name = "parse", description = "Email extraction"),
        (name = "health", description = "Probes and counters")
    )
)]
pub struct ApiDoc;

/// Build the full application router around shared state
pub fn create_router(state: Arc<AppState>) -> Router {
    let server = state.config.server.clone();

    let app = Router::new()
        .merge(routes::root_routes())
        .nest("/api/v1", routes::api_routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::metrics_middleware,
        ))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(DefaultBodyLimit::max(server.max_body_size))
        .layer(TraceLayer::new_for_http());

    if server.cors_enabled {
        app.layer(cors_layer(&server))
    } else {
        app
    }
}

/// Router over default config and the in-process rule-based tagger
pub fn create_router_for_testing() -> Router {
    create_router(Arc::new(AppState::default()))
}

/// Configured origins, or any origin when none are configured
fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins)
    }
}
