//! Pull requests seen through webhooks.

use chrono::{DateTime, Utc};
use github_client::webhook::PullRequestDetails;
use serde::{Deserialize, Serialize};

use crate::workflow::BranchPair;

#[cfg(test)]
#[path = "pull_request_tests.rs"]
mod tests;

/// A GitHub pull request, keyed by its GitHub id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub id: u64,
    pub number: u64,
    /// The latest action seen for the pull request.
    pub state: String,
    /// Repository full name.
    pub repository: String,
    pub base_ref: String,
    pub base_sha: String,
    pub head_ref: String,
    pub head_sha: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub creator: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PullRequest {
    pub fn from_details(details: &PullRequestDetails, repository: &str, action: &str) -> Self {
        let now = Utc::now();
        Self {
            id: details.id,
            number: details.number,
            state: action.to_string(),
            repository: repository.to_string(),
            base_ref: details.base.ref_name.clone(),
            base_sha: details.base.sha.clone(),
            head_ref: details.head.ref_name.clone(),
            head_sha: details.head.sha.clone(),
            title: details.title.clone(),
            body: details.body.clone(),
            creator: details.user.login.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refreshes the mutable fields from a later event, keeping the creation time.
    pub fn refresh(&mut self, details: &PullRequestDetails, action: &str) {
        self.state = action.to_string();
        self.base_ref = details.base.ref_name.clone();
        self.base_sha = details.base.sha.clone();
        self.head_ref = details.head.ref_name.clone();
        self.head_sha = details.head.sha.clone();
        self.title = details.title.clone();
        self.body = details.body.clone();
        self.updated_at = Utc::now();
    }

    pub fn branch_pair(&self) -> BranchPair<'_> {
        BranchPair {
            base_ref: &self.base_ref,
            head_ref: &self.head_ref,
            head_sha: &self.head_sha,
        }
    }
}
