//! Translation between HTTP types and domain types
//!
//! HTTP requests are validated while they are converted to domain requests. Domain
//! results are flattened into the camelCase response models.

use release_flow_core::{
    Build, BuildProgress, Configuration, ConfigurationRequest, ConfigurationUpdate,
    ValidationError, Verdict, WebhookOutcome, WorkflowType,
};

use crate::{
    errors::ApiError,
    models::{request::*, response::*},
};

#[cfg(test)]
#[path = "translation_tests.rs"]
mod tests;

/// Parse the workflow type named in a request.
fn parse_workflow_type(value: &str) -> Result<WorkflowType, ApiError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "gitflow" => Ok(WorkflowType::Gitflow),
        _ => Err(ValidationError::unsupported("workflowType", value).into()),
    }
}

/// Convert HTTP CreateConfigurationRequest to the domain ConfigurationRequest.
///
/// # Errors
///
/// Returns a validation error for an unknown workflow type. The remaining fields are
/// validated by the configuration service.
pub fn http_create_configuration_request_to_domain(
    http_req: CreateConfigurationRequest,
) -> Result<ConfigurationRequest, ApiError> {
    let workflow_type = match http_req.workflow_type.as_deref() {
        Some(value) => parse_workflow_type(value)?,
        None => WorkflowType::default(),
    };

    Ok(ConfigurationRequest {
        owner: http_req.owner,
        name: http_req.name,
        required_status_checks: http_req.required_status_checks,
        workflow_type,
        coverage_threshold: http_req.coverage_threshold.unwrap_or_default(),
    })
}

/// Convert HTTP UpdateConfigurationRequest to the domain ConfigurationUpdate.
pub fn http_update_configuration_request_to_domain(
    http_req: UpdateConfigurationRequest,
) -> Result<ConfigurationUpdate, ApiError> {
    let workflow_type = http_req
        .workflow_type
        .as_deref()
        .map(parse_workflow_type)
        .transpose()?;

    Ok(ConfigurationUpdate {
        required_status_checks: http_req.required_status_checks,
        workflow_type,
        coverage_threshold: http_req.coverage_threshold,
    })
}

impl From<Configuration> for ConfigurationResponse {
    fn from(configuration: Configuration) -> Self {
        Self {
            id: configuration.id,
            owner: configuration.owner,
            name: configuration.name,
            required_status_checks: configuration.required_status_checks,
            workflow_type: configuration.workflow_type.as_str().to_string(),
            coverage_threshold: configuration.coverage_threshold,
            created_at: configuration.created_at.to_rfc3339(),
            updated_at: configuration.updated_at.to_rfc3339(),
        }
    }
}

impl From<Build> for BuildResponse {
    fn from(build: Build) -> Self {
        let version = build.version();
        Self {
            id: build.id,
            repository: build.repository,
            sha: build.sha,
            version: version.to_string(),
            tag_name: version.tag_name(),
            build_type: build.build_type.as_str().to_string(),
            status: build.status.as_str().to_string(),
            branch: build.branch,
            username: build.username,
            github_url: build.github_url,
            created_at: build.created_at.to_rfc3339(),
        }
    }
}

impl From<BuildProgress> for BuildSummary {
    fn from(progress: BuildProgress) -> Self {
        let (status, missing_checks, build) = match progress {
            BuildProgress::NotAttempted => ("not_attempted", Vec::new(), None),
            BuildProgress::Pending { missing } => ("pending", missing, None),
            BuildProgress::Created { build } => ("created", Vec::new(), Some(build.into())),
            BuildProgress::AlreadyBuilt { build } => {
                ("already_built", Vec::new(), Some(build.into()))
            }
        };

        Self {
            status: status.to_string(),
            missing_checks,
            build,
        }
    }
}

/// Convert a processed webhook into the HTTP response.
pub fn domain_webhook_outcome_to_http(
    delivery_id: &str,
    outcome: WebhookOutcome,
) -> WebhookResponse {
    let webhook = outcome.webhook;
    let workflow = outcome.workflow.map(|check| WorkflowInfo {
        verdict: match check.verdict {
            Verdict::Compliant => "compliant",
            Verdict::NonCompliant => "non_compliant",
        }
        .to_string(),
        state: check.status.state.as_str().to_string(),
        description: check.status.description,
    });

    WebhookResponse {
        delivery_id: delivery_id.to_string(),
        webhook: WebhookInfo {
            id: webhook.id,
            event: webhook.event.as_str().to_string(),
            repository: webhook.repository,
            sha: webhook.sha,
            context: webhook.context,
            state: webhook.state,
            sender: webhook.sender,
        },
        workflow,
        build: outcome.build.into(),
    }
}
