//! Builds and semantic versioning.
//!
//! A [`Build`] is a cut release candidate. The version of a new build is derived from the
//! repository's latest build and an [`Increment`] chosen by [`increment_policy`] from the
//! branch pair of the pull request that produced it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::configuration::Configuration;

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;

/// Status check that is reported but never gates a build.
pub const INFORMATIONAL_CHECK: &str = "ci";

/// Check satisfied by an approved pull request review. Always part of the gate.
pub const REVIEW_CHECK: &str = "pull_request_review";

/// State under which approved reviews are recorded.
pub const APPROVED_REVIEW_STATE: &str = "approved";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Pending,
    Finished,
    Error,
}

impl BuildStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Finished => "finished",
            Self::Error => "error",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Pending => ":clock8:",
            Self::Finished => ":white_check_mark:",
            Self::Error => ":red_circle:",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    Productive,
    Test,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Productive => "productive",
            Self::Test => "test",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Increment {
    Major,
    Minor,
    Patch,
}

impl Increment {
    /// Parses an increment name. Unknown names mean a minor bump.
    pub fn parse(value: &str) -> Self {
        match value {
            "major" => Self::Major,
            "patch" => Self::Patch,
            _ => Self::Minor,
        }
    }
}

/// A `MAJOR.MINOR.PATCH[-PRE]` version.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SemanticVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<String>,
}

impl SemanticVersion {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            pre_release: None,
        }
    }

    /// Bumps one field and zeroes the fields below it. The pre-release tag is dropped.
    pub fn bump(&self, increment: Increment) -> Self {
        match increment {
            Increment::Major => Self::new(self.major + 1, 0, 0),
            Increment::Minor => Self::new(self.major, self.minor + 1, 0),
            Increment::Patch => Self::new(self.major, self.minor, self.patch + 1),
        }
    }

    pub fn with_pre_release(mut self, pre_release: Option<String>) -> Self {
        self.pre_release = pre_release;
        self
    }

    /// Release tag name, `v` followed by the version.
    pub fn tag_name(&self) -> String {
        format!("v{}", self)
    }
}

impl std::fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.pre_release {
            write!(f, "-{}", pre)?;
        }
        Ok(())
    }
}

/// Chooses the version increment and build type for a pull request.
///
/// | base    | head                        | increment | type       |
/// |---------|-----------------------------|-----------|------------|
/// | master  | `release/`                  | minor     | productive |
/// | master  | `hotfix/`                   | patch     | productive |
/// | develop | `feature/`, `enhancement/`  | minor     | test       |
/// | develop | `fix/`, `bugfix/`           | patch     | test       |
/// | other   |                             | minor     | test       |
pub fn increment_policy(base_ref: &str, head_ref: &str) -> (Increment, BuildType) {
    let head_has = |prefixes: &[&str]| prefixes.iter().any(|p| head_ref.starts_with(p));

    match base_ref {
        "master" if head_has(&["release/"]) => (Increment::Minor, BuildType::Productive),
        "master" if head_has(&["hotfix/"]) => (Increment::Patch, BuildType::Productive),
        "develop" if head_has(&["feature/", "enhancement/"]) => {
            (Increment::Minor, BuildType::Test)
        }
        "develop" if head_has(&["fix/", "bugfix/"]) => (Increment::Patch, BuildType::Test),
        _ => (Increment::Minor, BuildType::Test),
    }
}

/// The checks that must be recorded for a commit before it can be built: the configured
/// checks without [`INFORMATIONAL_CHECK`], plus [`REVIEW_CHECK`].
pub fn buildable_checks(configuration: &Configuration) -> Vec<String> {
    let mut checks: Vec<String> = configuration
        .required_status_checks
        .iter()
        .filter(|c| c.as_str() != INFORMATIONAL_CHECK && c.as_str() != REVIEW_CHECK)
        .cloned()
        .collect();
    checks.push(REVIEW_CHECK.to_string());
    checks
}

/// A cut release candidate. Never modified after it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: u64,
    pub sha: String,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<String>,
    pub status: BuildStatus,
    /// Head branch of the pull request.
    pub branch: String,
    /// Author of the pull request.
    pub username: String,
    /// Repository full name.
    pub repository: String,
    pub build_type: BuildType,
    pub body: Option<String>,
    pub github_release_id: Option<u64>,
    pub github_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Build {
    /// The starting point of a repository without builds: `0.0.0`, pending.
    pub fn initial(repository: &str) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            sha: String::new(),
            major: 0,
            minor: 0,
            patch: 0,
            pre_release: None,
            status: BuildStatus::Pending,
            branch: String::new(),
            username: String::new(),
            repository: repository.to_string(),
            build_type: BuildType::Test,
            body: None,
            github_release_id: None,
            github_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn version(&self) -> SemanticVersion {
        SemanticVersion {
            major: self.major,
            minor: self.minor,
            patch: self.patch,
            pre_release: self.pre_release.clone(),
        }
    }

    /// Link to the build under the report base URL.
    pub fn report_url(&self, base_url: &str) -> String {
        format!(
            "{}/{}/builds/{}",
            base_url.trim_end_matches('/'),
            self.repository,
            self.id
        )
    }

    /// Markdown build report posted on the pull request.
    pub fn report(&self, base_url: &str) -> String {
        let mut body = format!(
            "# Build report\n\n> **Status:** _{}_ {}\n\n**Version:** [{}]({})\n\n**Type:** {}\n",
            self.status.as_str(),
            self.status.emoji(),
            self.version(),
            self.report_url(base_url),
            self.build_type.as_str(),
        );
        if let Some(url) = &self.github_url {
            body.push_str(&format!("\n**Release:** {}\n", url));
        }
        body
    }
}

/// Per-repository pointer to the most recent build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestBuild {
    pub repository: String,
    pub build_id: u64,
    pub updated_at: DateTime<Utc>,
}

impl LatestBuild {
    pub fn new(repository: &str, build_id: u64) -> Self {
        Self {
            repository: repository.to_string(),
            build_id,
            updated_at: Utc::now(),
        }
    }
}
