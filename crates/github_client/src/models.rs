//! # Models
//!
//! This module contains the GitHub wire models used by the release flow: branches,
//! commit statuses, releases, issue comments and repositories.
//!
//! Only the fields the release flow reads are modelled; everything else in the GitHub
//! responses is ignored during deserialization.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;

/// A branch as returned by `GET /repos/{owner}/{repo}/branches/{branch}`.
///
/// # Examples
///
/// ```
/// use github_client::models::Branch;
///
/// let branch: Branch = serde_json::from_str(
///     r#"{"name":"develop","commit":{"sha":"6dcb09b"},"protected":false}"#,
/// ).unwrap();
/// assert_eq!(branch.commit.sha, "6dcb09b");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Branch {
    /// The name of the branch
    pub name: String,
    /// The commit at the tip of the branch
    pub commit: CommitRef,
    /// Whether the branch is currently protected
    #[serde(default)]
    pub protected: bool,
}

/// A commit reference carrying only its sha.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommitRef {
    pub sha: String,
}

/// The state of a commit status.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Error,
    Failure,
    Pending,
    Success,
}

impl StatusState {
    /// Returns the wire representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Failure => "failure",
            Self::Pending => "pending",
            Self::Success => "success",
        }
    }
}

impl std::fmt::Display for StatusState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /repos/{owner}/{repo}/statuses/{sha}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct CommitStatus {
    /// The state of the status
    pub state: StatusState,
    /// URL linking to more details about the status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    /// Short human readable description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Label differentiating this status from the status of other systems
    pub context: String,
}

/// Body of `POST /repos/{owner}/{repo}/releases`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ReleaseRequest {
    /// The name of the tag, e.g. `v1.3.0`
    pub tag_name: String,
    /// Commit sha or branch the tag is created from
    pub target_commitish: String,
    /// The name of the release
    pub name: String,
    /// Text describing the contents of the release
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub draft: bool,
    pub prerelease: bool,
}

/// A release as returned by GitHub after creation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Release {
    /// The unique ID of the release
    pub id: u64,
    /// The tag the release points to
    pub tag_name: String,
    /// The browser URL of the release
    pub html_url: String,
}

/// An issue or pull request comment as returned by GitHub after creation.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct IssueComment {
    pub id: u64,
    pub html_url: String,
}

/// Represents a GitHub repository.
///
/// Only the naming and default branch information is kept.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Repository {
    /// The name of the repository
    pub name: String,
    /// The full name of the repository (owner/name)
    #[serde(default)]
    pub full_name: Option<String>,
    /// The branch new pull requests target by default
    #[serde(default)]
    pub default_branch: Option<String>,
}

/// Represents a GitHub user account.
///
/// # Examples
///
/// ```rust
/// use github_client::models::User;
///
/// let user = User {
///     id: 12345,
///     login: "octocat".to_string(),
/// };
///
/// println!("User: {} (ID: {})", user.login, user.id);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct User {
    /// The unique numeric ID of the user
    #[serde(default)]
    pub id: u64,
    /// The login name of the user
    pub login: String,
}
