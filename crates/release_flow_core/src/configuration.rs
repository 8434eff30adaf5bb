//! Repository enrollment configuration.
//!
//! A [`Configuration`] enrolls one repository in the release process. Its identifier is
//! the repository full name (`owner/name`), which is also how inbound webhooks name the
//! repository.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

#[cfg(test)]
#[path = "configuration_tests.rs"]
mod tests;

/// Supported workflow definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowType {
    #[default]
    Gitflow,
}

impl WorkflowType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gitflow => "gitflow",
        }
    }
}

impl std::fmt::Display for WorkflowType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repository enrolled in the release process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// `owner/name`
    pub id: String,
    pub owner: String,
    pub name: String,
    /// Status contexts that must be reported before a build is cut.
    pub required_status_checks: Vec<String>,
    pub workflow_type: WorkflowType,
    /// Minimum code coverage, in percent.
    pub coverage_threshold: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Configuration {
    /// Derives the configuration identifier from the repository owner and name.
    pub fn id_for(owner: &str, name: &str) -> String {
        format!("{}/{}", owner, name)
    }

    /// Builds a new configuration from a validated request.
    pub fn from_request(request: ConfigurationRequest) -> Result<Self, ValidationError> {
        request.validate()?;

        let now = Utc::now();
        Ok(Self {
            id: Self::id_for(&request.owner, &request.name),
            owner: request.owner,
            name: request.name,
            required_status_checks: request.required_status_checks,
            workflow_type: request.workflow_type,
            coverage_threshold: request.coverage_threshold,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn requires_check(&self, context: &str) -> bool {
        self.required_status_checks.iter().any(|c| c == context)
    }

    /// Applies an update, returning `true` when the required checks were replaced.
    pub fn apply(&mut self, update: ConfigurationUpdate) -> Result<bool, ValidationError> {
        update.validate()?;

        let checks_replaced = match update.required_status_checks {
            Some(checks) => {
                self.required_status_checks = checks;
                true
            }
            None => false,
        };
        if let Some(workflow_type) = update.workflow_type {
            self.workflow_type = workflow_type;
        }
        if let Some(threshold) = update.coverage_threshold {
            self.coverage_threshold = threshold;
        }
        self.updated_at = Utc::now();

        Ok(checks_replaced)
    }
}

/// Request to enroll a repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationRequest {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub required_status_checks: Vec<String>,
    #[serde(default)]
    pub workflow_type: WorkflowType,
    #[serde(default)]
    pub coverage_threshold: f64,
}

impl ConfigurationRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.owner.trim().is_empty() {
            return Err(ValidationError::empty_field("owner"));
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::empty_field("name"));
        }
        if self.owner.contains('/') || self.name.contains('/') {
            return Err(ValidationError::invalid_format(
                "name",
                "owner and name must not contain '/'",
            ));
        }
        validate_checks(&self.required_status_checks)?;
        validate_threshold(self.coverage_threshold)
    }
}

/// Partial update of a configuration. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationUpdate {
    #[serde(default)]
    pub required_status_checks: Option<Vec<String>>,
    #[serde(default)]
    pub workflow_type: Option<WorkflowType>,
    #[serde(default)]
    pub coverage_threshold: Option<f64>,
}

impl ConfigurationUpdate {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(checks) = &self.required_status_checks {
            validate_checks(checks)?;
        }
        if let Some(threshold) = self.coverage_threshold {
            validate_threshold(threshold)?;
        }
        Ok(())
    }
}

fn validate_checks(checks: &[String]) -> Result<(), ValidationError> {
    if checks.iter().any(|c| c.trim().is_empty()) {
        return Err(ValidationError::empty_field("required_status_checks"));
    }
    Ok(())
}

fn validate_threshold(threshold: f64) -> Result<(), ValidationError> {
    if !(0.0..=100.0).contains(&threshold) {
        return Err(ValidationError::invalid_format(
            "coverage_threshold",
            "must be between 0 and 100",
        ));
    }
    Ok(())
}
