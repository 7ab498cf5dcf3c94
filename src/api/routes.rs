use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::middleware::logging_middleware;
use crate::errors::GenericError;
use crate::metrics;
use crate::render::Renderer;

pub const API_PREFIX: &str = "/api/v1";

/// Mount a service's routes under `/api/v1` with request logging and a
/// `/metrics` endpoint. Unknown paths get the generic not-found envelope.
pub fn build_router(service_routes: Router) -> Router {
    Router::new()
        .nest(API_PREFIX, service_routes)
        // Metrics endpoint (Prometheus)
        .route("/metrics", get(metrics::metrics_handler))
        .fallback(not_found)
        // Order matters: logging wraps every route, trace wraps logging
        .layer(middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
}

async fn not_found(renderer: Renderer) -> axum::response::Response {
    renderer.respond_api_error(&GenericError::NotFound.to_error())
}
