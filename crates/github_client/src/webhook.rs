//! GitHub webhook event types and payloads.
//!
//! Only the events the release flow reacts to are modelled. Payload structs keep the
//! fields the release flow reads and ignore the rest of the GitHub document.
//! See [GitHub webhook events documentation](https://docs.github.com/en/webhooks/webhook-events-and-payloads).

use serde::{Deserialize, Serialize};

use crate::models::{StatusState, User};

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

/// Header naming the event type of a delivery.
pub const EVENT_HEADER: &str = "x-github-event";

/// Header carrying the unique delivery id.
pub const DELIVERY_HEADER: &str = "x-github-delivery";

/// GitHub webhook event types handled by the release flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEvent {
    /// Activity related to pull requests
    PullRequest,
    /// Activity related to pull request reviews
    PullRequestReview,
    /// Activity related to commit statuses
    Status,
}

impl WebhookEvent {
    /// Converts the value of the event header to a WebhookEvent.
    ///
    /// Returns None if the string doesn't match a supported event type.
    pub fn from_header(s: &str) -> Option<Self> {
        match s {
            "pull_request" => Some(Self::PullRequest),
            "pull_request_review" => Some(Self::PullRequestReview),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    /// Converts the WebhookEvent to a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PullRequest => "pull_request",
            Self::PullRequestReview => "pull_request_review",
            Self::Status => "status",
        }
    }
}

impl std::fmt::Display for WebhookEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The repository section common to every payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryRef {
    /// The name of the repository
    pub name: String,
    /// The full name of the repository (owner/name)
    pub full_name: String,
    /// The owner of the repository
    pub owner: User,
}

/// Payload of a `status` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusEventPayload {
    /// The commit the status belongs to
    pub sha: String,
    /// The status context, e.g. `ci` or `workflow`
    pub context: String,
    /// The new state
    pub state: StatusState,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub target_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    pub repository: RepositoryRef,
    pub sender: User,
}

/// A branch reference on one side of a pull request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestRef {
    /// The branch name
    #[serde(rename = "ref", default)]
    pub ref_name: String,
    /// The commit at the tip of the branch
    #[serde(default)]
    pub sha: String,
}

/// The pull request section of `pull_request` and `pull_request_review` payloads.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestDetails {
    /// The GitHub ID of the pull request
    pub id: u64,
    /// The pull request number within the repository
    pub number: u64,
    /// `open` or `closed`
    pub state: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// The user who opened the pull request
    #[serde(default)]
    pub user: User,
    /// The branch the changes are merged into
    #[serde(default)]
    pub base: PullRequestRef,
    /// The branch the changes come from
    pub head: PullRequestRef,
}

/// Payload of a `pull_request` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestEventPayload {
    /// The action that was performed, e.g. `opened` or `synchronize`
    pub action: String,
    pub number: u64,
    pub pull_request: PullRequestDetails,
    pub repository: RepositoryRef,
    pub sender: User,
}

/// The state a submitted review leaves the pull request in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    #[serde(other)]
    Unknown,
}

impl ReviewState {
    /// Returns the wire representation of the state.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::ChangesRequested => "changes_requested",
            Self::Commented => "commented",
            Self::Dismissed => "dismissed",
            Self::Unknown => "unknown",
        }
    }
}

/// The review section of a `pull_request_review` payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Review {
    pub id: u64,
    #[serde(default)]
    pub user: User,
    #[serde(default)]
    pub body: Option<String>,
    /// The commit the review was submitted against
    #[serde(default)]
    pub commit_id: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    pub state: ReviewState,
}

/// Payload of a `pull_request_review` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PullRequestReviewEventPayload {
    /// `submitted`, `edited` or `dismissed`
    pub action: String,
    pub review: Review,
    pub pull_request: PullRequestDetails,
    pub repository: RepositoryRef,
    pub sender: User,
}
