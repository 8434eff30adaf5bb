//! Release flow settings.
//!
//! Settings are read from an optional TOML file. Every field has a default, so an
//! empty file (or no file at all) is a valid configuration.
//!
//! # TOML Format
//!
//! ```toml
//! workflow_target_url = "https://wiki.example.com/gitflow"
//! build_report_base_url = "https://releases.example.com"
//! max_protection_attempts = 3
//! test_build_pre_release = "rc"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::errors::SettingsError;

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;

pub const DEFAULT_WORKFLOW_TARGET_URL: &str =
    "https://nvie.com/posts/a-successful-git-branching-model/";
pub const DEFAULT_BUILD_REPORT_BASE_URL: &str = "http://localhost:8080/api/v1/repositories";
pub const DEFAULT_MAX_PROTECTION_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReleaseFlowSettings {
    /// Target URL attached to published workflow statuses.
    pub workflow_target_url: String,

    /// Base URL of the build links in build report comments.
    pub build_report_base_url: String,

    /// Attempts to protect a single branch before enrollment gives up.
    pub max_protection_attempts: u32,

    /// Pre-release tag attached to test builds, e.g. `rc`.
    pub test_build_pre_release: Option<String>,
}

impl Default for ReleaseFlowSettings {
    fn default() -> Self {
        Self {
            workflow_target_url: DEFAULT_WORKFLOW_TARGET_URL.to_string(),
            build_report_base_url: DEFAULT_BUILD_REPORT_BASE_URL.to_string(),
            max_protection_attempts: DEFAULT_MAX_PROTECTION_ATTEMPTS,
            test_build_pre_release: None,
        }
    }
}

impl ReleaseFlowSettings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Self = toml::from_str(content).map_err(|e| SettingsError::ParseError {
            reason: e.to_string(),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a TOML file.
    #[instrument]
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SettingsError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => SettingsError::FileAccessError {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;

        let settings = Self::from_toml_str(&content)?;
        debug!(path = %path.display(), "Loaded release flow settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_protection_attempts == 0 {
            return Err(SettingsError::InvalidValue {
                field: "max_protection_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        if let Some(tag) = &self.test_build_pre_release {
            if tag.is_empty() || !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-') {
                return Err(SettingsError::InvalidValue {
                    field: "test_build_pre_release".to_string(),
                    reason: "must be a non-empty dot separated list of alphanumerics and hyphens"
                        .to_string(),
                });
            }
        }
        Ok(())
    }
}
