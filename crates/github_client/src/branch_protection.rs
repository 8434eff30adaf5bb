//! Branch protection domain types.
//!
//! This module contains the request body sent to
//! `PUT /repos/{owner}/{repo}/branches/{branch}/protection`.

use serde::{Deserialize, Serialize};

#[cfg(test)]
#[path = "branch_protection_tests.rs"]
mod tests;

/// Protection rules applied to a single branch.
///
/// GitHub requires every top-level key to be present in the request, so the optional
/// sections serialize as `null` instead of being skipped.
///
/// # Examples
///
/// ```rust
/// use github_client::{BranchProtectionRequest, RequiredStatusChecks};
///
/// let request = BranchProtectionRequest {
///     required_status_checks: Some(RequiredStatusChecks {
///         strict: true,
///         contexts: vec!["workflow".to_string()],
///     }),
///     enforce_admins: true,
///     required_pull_request_reviews: None,
///     restrictions: None,
/// };
/// assert!(request.enforce_admins);
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct BranchProtectionRequest {
    /// Status checks that must pass before merging.
    pub required_status_checks: Option<RequiredStatusChecks>,
    /// Whether the rules also apply to repository administrators.
    pub enforce_admins: bool,
    /// Pull request review requirements.
    pub required_pull_request_reviews: Option<RequiredPullRequestReviews>,
    /// Push restrictions. Always `null` for the release flow.
    pub restrictions: Option<BranchRestrictions>,
}

/// Required status checks section of a protection request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct RequiredStatusChecks {
    /// Require branches to be up to date before merging.
    pub strict: bool,
    /// Status check contexts that must succeed.
    pub contexts: Vec<String>,
}

/// Required pull request reviews section of a protection request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct RequiredPullRequestReviews {
    /// Dismiss approvals when new commits are pushed
    pub dismiss_stale_reviews: bool,
    /// Require a review from a code owner
    pub require_code_owner_reviews: bool,
    /// Required number of approving reviews before merging
    pub required_approving_review_count: u32,
}

/// Users, teams and apps allowed to push to a protected branch.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq, Serialize)]
pub struct BranchRestrictions {
    pub users: Vec<String>,
    pub teams: Vec<String>,
}
