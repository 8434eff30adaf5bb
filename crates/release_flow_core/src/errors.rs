//! Error types for the release flow.
//!
//! [`ReleaseFlowError`] is the top-level error returned by every core operation. It is
//! built from category errors ([`ValidationError`], [`StorageError`] and the GitHub
//! client error) and exposes a typed [`ErrorKind`] so that the HTTP layer can pick a
//! response without inspecting messages.

use thiserror::Error;

#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Top-level error type for release flow operations.
#[derive(Error, Debug)]
pub enum ReleaseFlowError {
    /// The input was malformed or incomplete.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A configuration, pull request, webhook or branch does not exist.
    #[error("{resource} not found: {id}")]
    NotFound { resource: String, id: String },

    /// The event was already recorded.
    #[error("{resource} already exists: {id}")]
    Conflict { resource: String, id: String },

    /// Not every required check has been recorded for the commit yet.
    #[error("Not all quality controls passed yet for {sha}; missing: {}", .missing.join(", "))]
    QualityGateIncomplete { sha: String, missing: Vec<String> },

    /// A GitHub call failed.
    #[error("GitHub operation failed: {0}")]
    GitHub(#[from] github_client::Error),

    /// A storage call failed.
    #[error("Storage operation failed: {0}")]
    Storage(#[from] StorageError),

    /// Protection of a branch kept failing after it was created.
    #[error("Gave up protecting branch '{branch}' after {attempts} attempts")]
    ProtectionAttemptsExhausted { branch: String, attempts: u32 },
}

/// Classification of a [`ReleaseFlowError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BadRequest,
    NotFound,
    Conflict,
    QualityGateIncomplete,
    Internal,
}

impl ReleaseFlowError {
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    pub fn conflict(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Conflict {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Converts a storage lookup failure, keeping not-found distinct from other failures.
    pub fn from_lookup(
        err: StorageError,
        resource: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        match err {
            StorageError::NotFound { .. } => Self::not_found(resource, id),
            other => Self::Storage(other),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::BadRequest,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::QualityGateIncomplete { .. } => ErrorKind::QualityGateIncomplete,
            Self::GitHub(github_client::Error::BranchNotFound { .. }) => ErrorKind::NotFound,
            Self::GitHub(github_client::Error::BadRequest(_)) => ErrorKind::BadRequest,
            Self::GitHub(_) | Self::Storage(_) | Self::ProtectionAttemptsExhausted { .. } => {
                ErrorKind::Internal
            }
        }
    }

    /// Returns `true` for outcomes that happen during normal operation and must not be
    /// reported as failures: duplicate deliveries and an incomplete quality gate.
    pub fn is_expected(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Conflict | ErrorKind::QualityGateIncomplete
        )
    }
}

/// Input validation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Field '{field}' value '{value}' is not supported")]
    Unsupported { field: String, value: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::EmptyField {
            field: field.into(),
        }
    }

    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Unsupported {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Errors reported by a [`Storage`](crate::storage::Storage) implementation.
///
/// `NotFound` is distinct from every other failure and callers branch on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("Storage backend failure: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn duplicate(entity: &'static str, key: impl Into<String>) -> Self {
        Self::Duplicate {
            entity,
            key: key.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Failures loading [`ReleaseFlowSettings`](crate::settings::ReleaseFlowSettings).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Settings file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to access settings file: {path} - {reason}")]
    FileAccessError { path: String, reason: String },

    #[error("Failed to parse settings: {reason}")]
    ParseError { reason: String },

    #[error("Invalid settings: {field} - {reason}")]
    InvalidValue { field: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ReleaseFlowError>;
