//! HTTP routing configuration
//!
//! # Route Structure
//!
//! All routes are prefixed with `/api/v1`:
//!
//! - POST   /api/v1/webhooks - Receive a GitHub webhook
//! - POST   /api/v1/configurations - Enroll a repository
//! - GET    /api/v1/configurations/:owner/:repo - Get a configuration
//! - PUT    /api/v1/configurations/:owner/:repo - Update a configuration
//! - DELETE /api/v1/configurations/:owner/:repo - Remove a configuration
//! - GET    /api/v1/repositories/:owner/:repo/builds/:id - Get a build
//! - GET    /api/v1/health - Health check
//! - GET    /api/v1/metrics - Prometheus metrics

use axum::{
    http::{header, HeaderName, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{handlers, middleware as api_middleware, AppState};

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;

/// Create the complete API router with all routes configured.
///
/// This function sets up:
/// - All endpoint routes
/// - CORS configuration
/// - Request tracing
/// - Timeout handling
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(github_client::webhook::EVENT_HEADER),
            HeaderName::from_static(github_client::webhook::DELIVERY_HEADER),
        ])
        .allow_credentials(false)
        .max_age(Duration::from_secs(3600));

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().include_headers(true))
        .on_response(DefaultOnResponse::new().include_headers(true));

    // GitHub gives up on a delivery after 10 seconds
    let timeout_layer = TimeoutLayer::new(Duration::from_secs(10));

    let api_v1 = Router::new()
        .route("/webhooks", post(handlers::receive_webhook))
        .nest("/configurations", configuration_routes())
        .route(
            "/repositories/:owner/:repo/builds/:id",
            get(handlers::get_build),
        )
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics))
        .layer(middleware::from_fn(api_middleware::tracing_middleware))
        .layer(timeout_layer)
        .layer(trace_layer)
        .layer(cors)
        .with_state(state);

    Router::new().nest("/api/v1", api_v1)
}

/// Configuration routes (nested under /configurations)
fn configuration_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_configuration))
        .route(
            "/:owner/:repo",
            get(handlers::get_configuration)
                .put(handlers::update_configuration)
                .delete(handlers::delete_configuration),
        )
}
