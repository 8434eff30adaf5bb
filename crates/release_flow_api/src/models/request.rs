//! HTTP request type definitions
//!
//! Request types accept relaxed input: the workflow type is a plain string and optional
//! fields fall back to defaults. They are validated while being translated to domain
//! requests.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;

/// HTTP request to enroll a repository.
///
/// # Example
///
/// ```json
/// {
///   "owner": "octocat",
///   "name": "hello-world",
///   "requiredStatusChecks": ["workflow", "ci", "minimum-coverage"],
///   "workflowType": "gitflow",
///   "coverageThreshold": 80.0
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateConfigurationRequest {
    pub owner: String,
    pub name: String,

    /// Status contexts that must pass before a build is cut
    #[serde(default)]
    pub required_status_checks: Vec<String>,

    /// Workflow type, `gitflow` when absent
    #[serde(default)]
    pub workflow_type: Option<String>,

    /// Minimum coverage in percent, 0 when absent
    #[serde(default)]
    pub coverage_threshold: Option<f64>,
}

/// HTTP request to change an enrolled repository. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateConfigurationRequest {
    #[serde(default)]
    pub required_status_checks: Option<Vec<String>>,

    #[serde(default)]
    pub workflow_type: Option<String>,

    #[serde(default)]
    pub coverage_threshold: Option<f64>,
}
