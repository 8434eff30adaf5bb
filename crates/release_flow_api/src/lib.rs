//! ReleaseFlow REST API
//!
//! This crate provides the HTTP surface of the release flow: the GitHub webhook
//! receiver, repository enrollment endpoints, build lookup, health and metrics.
//!
//! # Architecture
//!
//! This crate exists in the HTTP layer and handles:
//! - HTTP request/response translation
//! - Error mapping from domain to HTTP
//! - Routing and server configuration
//!
//! The dependency flows HTTP API → business logic, never the reverse.

use std::sync::Arc;

use github_client::RepositoryClient;
use prometheus::Registry;
use release_flow_core::{
    ConfigurationService, PrometheusReleaseMetrics, ReleaseFlow, ReleaseFlowSettings, Storage,
    WebhookService,
};

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod translation;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use errors::{ApiError, ErrorResponse};
pub use models::{request, response};
pub use server::{ApiConfig, ApiServer};

/// API version
pub const API_VERSION: &str = "v1";

/// Default API port
pub const DEFAULT_PORT: u16 = 8080;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub webhooks: Arc<WebhookService>,
    pub configurations: Arc<ConfigurationService>,
    pub storage: Arc<dyn Storage>,
    /// Registry exposed on the metrics endpoint
    pub registry: Registry,
}

impl AppState {
    /// Create the application state, registering the release flow metrics in `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics are already registered in `registry`.
    pub fn new(
        storage: Arc<dyn Storage>,
        client: Arc<dyn RepositoryClient>,
        settings: ReleaseFlowSettings,
        registry: Registry,
    ) -> Result<Self, prometheus::Error> {
        let metrics = Arc::new(PrometheusReleaseMetrics::new(&registry)?);
        let flow = ReleaseFlow::new(storage.clone(), client, metrics, settings);

        Ok(Self {
            webhooks: flow.webhooks,
            configurations: flow.configurations,
            storage,
            registry,
        })
    }
}
