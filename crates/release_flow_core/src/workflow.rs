//! Workflow policy engine.
//!
//! A [`WorkflowDefinition`] lists the branches a workflow polices, each with the head
//! branch prefixes it accepts pull requests from. [`check_workflow`] evaluates a
//! base/head pair against a definition and produces the commit status that reports the
//! verdict on the pull request head.
//!
//! Definitions are never persisted; they are derived from a [`Configuration`] when
//! needed.

use github_client::{BranchProtectionRequest, CommitStatus, RequiredStatusChecks, StatusState};
use serde::{Deserialize, Serialize};

use crate::configuration::{Configuration, WorkflowType};

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;

/// Status context under which workflow verdicts are published.
pub const WORKFLOW_CONTEXT: &str = "workflow";

pub const COMPLIANT_DESCRIPTION: &str = "Great! You comply with the workflow";
pub const NON_COMPLIANT_DESCRIPTION: &str = "Oops! You're not complying with the workflow.";

/// Rules a policed branch imposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    /// Head branch prefixes allowed to merge into the branch.
    pub accepted_head_prefixes: Vec<String>,
    pub enforce_admins: bool,
    /// Status contexts required by branch protection.
    pub required_status_checks: Vec<String>,
    /// Whether protection is applied when the repository is enrolled.
    pub protect_at_startup: bool,
}

/// A branch, or a family of branches sharing a prefix, policed by a workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPolicy {
    /// Exact branch name, or the prefix when `starts_with` is set.
    pub name: String,
    pub stable: bool,
    pub starts_with: bool,
    pub releasable: bool,
    pub requirements: Requirements,
}

impl BranchPolicy {
    pub fn matches(&self, base_ref: &str) -> bool {
        if self.starts_with {
            base_ref.starts_with(&self.name)
        } else {
            base_ref == self.name
        }
    }

    pub fn accepts(&self, head_ref: &str) -> bool {
        self.requirements
            .accepted_head_prefixes
            .iter()
            .any(|prefix| head_ref.starts_with(prefix.as_str()))
    }

    /// Returns the GitHub protection rules encoding this policy.
    pub fn protection_request(&self) -> BranchProtectionRequest {
        BranchProtectionRequest {
            required_status_checks: Some(RequiredStatusChecks {
                strict: true,
                contexts: self.requirements.required_status_checks.clone(),
            }),
            enforce_admins: self.requirements.enforce_admins,
            required_pull_request_reviews: None,
            restrictions: None,
        }
    }
}

/// An ordered list of branch policies. The first matching policy wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub workflow_type: WorkflowType,
    pub default_branch: String,
    pub branches: Vec<BranchPolicy>,
}

impl WorkflowDefinition {
    pub fn for_configuration(configuration: &Configuration) -> Self {
        match configuration.workflow_type {
            WorkflowType::Gitflow => Self::gitflow(&configuration.required_status_checks),
        }
    }

    /// The gitflow definition: `master`, `develop` and the `release/` family.
    pub fn gitflow(required_status_checks: &[String]) -> Self {
        let policy = |name: &str,
                      starts_with: bool,
                      releasable: bool,
                      protect_at_startup: bool,
                      accepted: &[&str]| BranchPolicy {
            name: name.to_string(),
            stable: true,
            starts_with,
            releasable,
            requirements: Requirements {
                accepted_head_prefixes: accepted.iter().map(|p| p.to_string()).collect(),
                enforce_admins: true,
                required_status_checks: required_status_checks.to_vec(),
                protect_at_startup,
            },
        };

        Self {
            workflow_type: WorkflowType::Gitflow,
            default_branch: "develop".to_string(),
            branches: vec![
                policy("master", false, true, true, &["release/", "hotfix/"]),
                policy(
                    "develop",
                    false,
                    false,
                    true,
                    &["feature/", "fix/", "enhancement/", "bugfix/"],
                ),
                policy("release/", true, false, false, &["hotfix/"]),
            ],
        }
    }

    pub fn policy_for(&self, base_ref: &str) -> Option<&BranchPolicy> {
        self.branches.iter().find(|p| p.matches(base_ref))
    }

    /// Policies protected when the repository is enrolled.
    pub fn protected_at_startup(&self) -> impl Iterator<Item = &BranchPolicy> {
        self.branches
            .iter()
            .filter(|p| p.stable && p.requirements.protect_at_startup)
    }

    /// Evaluates a base/head pair. Unpoliced base branches are compliant.
    pub fn verdict(&self, base_ref: &str, head_ref: &str) -> Verdict {
        match self.policy_for(base_ref) {
            None => Verdict::Compliant,
            Some(policy) if policy.accepts(head_ref) => Verdict::Compliant,
            Some(_) => Verdict::NonCompliant,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Compliant,
    NonCompliant,
}

/// A commit status to publish for a repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Repository full name.
    pub repository: String,
    pub sha: String,
    pub context: String,
    pub state: StatusState,
    pub description: Option<String>,
    pub target_url: Option<String>,
}

impl StatusEvent {
    pub fn to_commit_status(&self) -> CommitStatus {
        CommitStatus {
            state: self.state,
            target_url: self.target_url.clone(),
            description: self.description.clone(),
            context: self.context.clone(),
        }
    }
}

/// The branch pair of a pull request, with the sha of its head.
#[derive(Debug, Clone, Copy)]
pub struct BranchPair<'a> {
    pub base_ref: &'a str,
    pub head_ref: &'a str,
    pub head_sha: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowCheck {
    pub verdict: Verdict,
    pub status: StatusEvent,
}

/// Checks a pull request against a workflow and builds the status to publish.
pub fn check_workflow(
    definition: &WorkflowDefinition,
    repository: &str,
    pair: BranchPair<'_>,
    target_url: Option<&str>,
) -> WorkflowCheck {
    let verdict = definition.verdict(pair.base_ref, pair.head_ref);
    let (state, description) = match verdict {
        Verdict::Compliant => (StatusState::Success, COMPLIANT_DESCRIPTION),
        Verdict::NonCompliant => (StatusState::Error, NON_COMPLIANT_DESCRIPTION),
    };

    WorkflowCheck {
        verdict,
        status: StatusEvent {
            repository: repository.to_string(),
            sha: pair.head_sha.to_string(),
            context: WORKFLOW_CONTEXT.to_string(),
            state,
            description: Some(description.to_string()),
            target_url: target_url.map(str::to_string),
        },
    }
}
