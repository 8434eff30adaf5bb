//! HTTP response type definitions
//!
//! Response types are built from domain results in [`crate::translation`] and use
//! camelCase for JSON serialization.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;

/// An enrolled repository.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationResponse {
    /// `owner/name`
    pub id: String,
    pub owner: String,
    pub name: String,
    pub required_status_checks: Vec<String>,
    pub workflow_type: String,
    pub coverage_threshold: f64,
    pub created_at: String, // ISO 8601 format
    pub updated_at: String, // ISO 8601 format
}

/// A cut build.
///
/// # Example
///
/// ```json
/// {
///   "id": 4,
///   "repository": "octocat/hello-world",
///   "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e",
///   "version": "1.3.0",
///   "tagName": "v1.3.0",
///   "buildType": "productive",
///   "status": "finished",
///   "branch": "release/1.2",
///   "username": "octocat",
///   "githubUrl": "https://github.com/octocat/hello-world/releases/tag/v1.3.0",
///   "createdAt": "2025-11-12T10:30:00Z"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResponse {
    pub id: u64,
    pub repository: String,
    pub sha: String,
    pub version: String,
    pub tag_name: String,
    pub build_type: String,
    pub status: String,
    pub branch: String,
    pub username: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub github_url: Option<String>,

    pub created_at: String, // ISO 8601 format
}

/// What the quality gate did for a webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildSummary {
    /// `not_attempted`, `pending`, `created` or `already_built`
    pub status: String,

    /// Checks still missing when the gate is pending
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub missing_checks: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildResponse>,
}

/// The recorded webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookInfo {
    /// Dedup id
    pub id: String,
    pub event: String,
    pub repository: String,
    pub sha: String,
    pub context: String,
    pub state: String,
    pub sender: String,
}

/// The workflow verdict published for a pull request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowInfo {
    pub verdict: String,
    pub state: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Response to an accepted webhook delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    /// Value of the delivery header
    pub delivery_id: String,
    pub webhook: WebhookInfo,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub workflow: Option<WorkflowInfo>,

    pub build: BuildSummary,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheckResponse {
    /// Service status: "healthy" or "unhealthy"
    pub status: String,

    /// Service version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Current timestamp (ISO 8601)
    pub timestamp: String,
}
