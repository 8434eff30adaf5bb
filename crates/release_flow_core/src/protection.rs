//! Branch protection orchestration.
//!
//! Enrollment protects every stable branch of the workflow that asks for protection at
//! startup. A branch that does not exist yet is created from the workflow's default
//! branch and queued again, so it is protected on a later pass of the same run.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use github_client::{Error as GitHubError, RepositoryClient};
use tracing::{debug, info, instrument};

use crate::configuration::Configuration;
use crate::errors::ReleaseFlowError;
use crate::settings::DEFAULT_MAX_PROTECTION_ATTEMPTS;
use crate::workflow::{BranchPolicy, WorkflowDefinition};

#[cfg(test)]
#[path = "protection_tests.rs"]
mod tests;

/// Branch used as the source when the default branch itself has to be created.
const FALLBACK_SOURCE_BRANCH: &str = "master";

/// Applies and removes the branch protection encoding a workflow.
#[derive(Clone)]
pub struct BranchProtectionOrchestrator {
    client: Arc<dyn RepositoryClient>,
    max_attempts: u32,
}

impl BranchProtectionOrchestrator {
    pub fn new(client: Arc<dyn RepositoryClient>) -> Self {
        Self {
            client,
            max_attempts: DEFAULT_MAX_PROTECTION_ATTEMPTS,
        }
    }

    /// Sets how many times a single branch may be tried before giving up.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Protects the workflow branches of a repository and sets its default branch.
    ///
    /// # Errors
    ///
    /// Returns the first protection error other than a missing branch, any error from
    /// creating a missing branch, or `ProtectionAttemptsExhausted` when a branch still
    /// cannot be protected after the configured number of attempts.
    #[instrument(skip(self, configuration), fields(repository = %configuration.id))]
    pub async fn set_workflow(&self, configuration: &Configuration) -> Result<(), ReleaseFlowError> {
        let definition = WorkflowDefinition::for_configuration(configuration);
        let mut queue: VecDeque<&BranchPolicy> = definition.protected_at_startup().collect();
        let mut attempts: HashMap<&str, u32> = HashMap::new();

        while let Some(policy) = queue.pop_front() {
            let tried = attempts.entry(policy.name.as_str()).or_insert(0);
            if *tried >= self.max_attempts {
                return Err(ReleaseFlowError::ProtectionAttemptsExhausted {
                    branch: policy.name.clone(),
                    attempts: *tried,
                });
            }
            *tried += 1;

            let result = self
                .client
                .protect_branch(
                    &configuration.owner,
                    &configuration.name,
                    &policy.name,
                    &policy.protection_request(),
                )
                .await;

            match result {
                Ok(()) => {
                    info!(branch = %policy.name, "Protected branch");
                }
                Err(GitHubError::BranchNotFound { .. }) => {
                    let source = if policy.name == definition.default_branch {
                        FALLBACK_SOURCE_BRANCH
                    } else {
                        definition.default_branch.as_str()
                    };
                    debug!(branch = %policy.name, source, "Branch missing, creating it");

                    self.client
                        .create_branch_from(
                            &configuration.owner,
                            &configuration.name,
                            &policy.name,
                            source,
                        )
                        .await?;
                    queue.push_back(policy);
                }
                Err(e) => return Err(e.into()),
            }
        }

        self.client
            .set_default_branch(
                &configuration.owner,
                &configuration.name,
                &definition.default_branch,
            )
            .await?;

        info!(default_branch = %definition.default_branch, "Workflow applied");
        Ok(())
    }

    /// Removes the protection applied by [`set_workflow`](Self::set_workflow).
    ///
    /// Branches that no longer exist are skipped.
    #[instrument(skip(self, configuration), fields(repository = %configuration.id))]
    pub async fn unset_workflow(
        &self,
        configuration: &Configuration,
    ) -> Result<(), ReleaseFlowError> {
        let definition = WorkflowDefinition::for_configuration(configuration);

        for policy in definition.protected_at_startup() {
            match self
                .client
                .unprotect_branch(&configuration.owner, &configuration.name, &policy.name)
                .await
            {
                Ok(()) => info!(branch = %policy.name, "Removed branch protection"),
                Err(GitHubError::BranchNotFound { .. }) => {
                    debug!(branch = %policy.name, "Branch already gone");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
