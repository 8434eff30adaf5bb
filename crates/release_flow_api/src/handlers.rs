//! HTTP request handlers
//!
//! Handlers translate HTTP requests to release flow operations and their results to
//! HTTP responses.
//!
//! # Architecture
//!
//! Each handler:
//! 1. Extracts HTTP request data (path params, headers, body)
//! 2. Translates HTTP types to domain types
//! 3. Calls the webhook or configuration service
//! 4. Translates domain results to HTTP responses

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use github_client::webhook::{DELIVERY_HEADER, EVENT_HEADER};
use github_client::WebhookEvent;
use prometheus::{Encoder, TextEncoder};
use release_flow_core::{Configuration, ReleaseFlowError, Storage};

use crate::{
    errors::ApiError,
    models::{request::*, response::*},
    translation::{
        domain_webhook_outcome_to_http, http_create_configuration_request_to_domain,
        http_update_configuration_request_to_domain,
    },
    AppState,
};

#[cfg(test)]
#[path = "handlers_tests.rs"]
mod tests;

fn required_header<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str, ApiError> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::validation(name, "header is required"))
}

/// POST /api/v1/webhooks
///
/// Receive a GitHub webhook delivery.
///
/// Returns 200 when the event was processed, 206 when it was recorded but the quality
/// gate is still waiting for checks.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<WebhookResponse>), ApiError> {
    let event_name = required_header(&headers, EVENT_HEADER)?;
    let delivery_id = required_header(&headers, DELIVERY_HEADER)?;

    let event = WebhookEvent::from_header(event_name).ok_or_else(|| {
        ApiError::validation(
            EVENT_HEADER,
            format!("event '{}' not supported", event_name),
        )
    })?;

    tracing::info!(event = %event, delivery_id = %delivery_id, "Received webhook");

    let outcome = state.webhooks.dispatch(event, &body).await?;
    let status = if outcome.is_pending() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(domain_webhook_outcome_to_http(delivery_id, outcome)),
    ))
}

/// POST /api/v1/configurations
///
/// Enroll a repository. Returns 201 when it was enrolled and 200 with the stored
/// configuration when it already was.
pub async fn create_configuration(
    State(state): State<AppState>,
    Json(request): Json<CreateConfigurationRequest>,
) -> Result<(StatusCode, Json<ConfigurationResponse>), ApiError> {
    let request = http_create_configuration_request_to_domain(request)?;

    let outcome = state.configurations.create(request).await?;
    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(outcome.configuration.into())))
}

/// GET /api/v1/configurations/:owner/:repo
pub async fn get_configuration(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<Json<ConfigurationResponse>, ApiError> {
    let configuration = state
        .configurations
        .get(&Configuration::id_for(&owner, &repo))
        .await?;

    Ok(Json(configuration.into()))
}

/// PUT /api/v1/configurations/:owner/:repo
pub async fn update_configuration(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
    Json(request): Json<UpdateConfigurationRequest>,
) -> Result<Json<ConfigurationResponse>, ApiError> {
    let update = http_update_configuration_request_to_domain(request)?;

    let configuration = state
        .configurations
        .update(&Configuration::id_for(&owner, &repo), update)
        .await?;

    Ok(Json(configuration.into()))
}

/// DELETE /api/v1/configurations/:owner/:repo
pub async fn delete_configuration(
    State(state): State<AppState>,
    Path((owner, repo)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state
        .configurations
        .delete(&Configuration::id_for(&owner, &repo))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/repositories/:owner/:repo/builds/:id
///
/// The build report comment links here.
pub async fn get_build(
    State(state): State<AppState>,
    Path((owner, repo, id)): Path<(String, String, u64)>,
) -> Result<Json<BuildResponse>, ApiError> {
    let repository = Configuration::id_for(&owner, &repo);

    let build = state
        .storage
        .get_build(id)
        .await
        .map_err(|e| ReleaseFlowError::from_lookup(e, "build", id.to_string()))?;
    if build.repository != repository {
        return Err(ReleaseFlowError::not_found("build", id.to_string()).into());
    }

    Ok(Json(build.into()))
}

/// GET /api/v1/health
///
/// Health check endpoint.
///
/// Returns service health status with version and timestamp.
pub async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "healthy".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// GET /api/v1/metrics
///
/// Prometheus metrics in the text exposition format.
pub async fn metrics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder
        .encode(&state.registry.gather(), &mut buffer)
        .map_err(|e| ApiError::internal(format!("Failed to encode metrics: {}", e)))?;

    Ok((
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    ))
}
