//! Quality gate and build cutting.
//!
//! [`BuildEngine::process_build`] runs whenever a passing check is recorded for a commit.
//! It verifies that every buildable check has been recorded for the commit, chooses the
//! version of the new build from the pull request that owns the commit, creates the
//! GitHub release, stores the build and reports it on the pull request.

use std::sync::Arc;

use github_client::{ReleaseRequest, RepositoryClient};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::build::{
    buildable_checks, increment_policy, Build, BuildStatus, BuildType, LatestBuild,
    APPROVED_REVIEW_STATE, REVIEW_CHECK,
};
use crate::configuration::Configuration;
use crate::errors::ReleaseFlowError;
use crate::locks::KeyedLocks;
use crate::metrics::ReleaseMetrics;
use crate::pull_request::PullRequest;
use crate::settings::ReleaseFlowSettings;
use crate::storage::Storage;
use crate::webhook::WebhookRecorder;
use crate::workflow::StatusEvent;

#[cfg(test)]
#[path = "build_engine_tests.rs"]
mod tests;

/// Result of a quality gate pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", content = "build", rename_all = "snake_case")]
pub enum BuildOutcome {
    /// A new build was cut.
    Created(Build),
    /// The commit had already been built; nothing was changed.
    AlreadyBuilt(Build),
}

impl BuildOutcome {
    pub fn build(&self) -> &Build {
        match self {
            Self::Created(b) | Self::AlreadyBuilt(b) => b,
        }
    }
}

pub struct BuildEngine {
    storage: Arc<dyn Storage>,
    client: Arc<dyn RepositoryClient>,
    recorder: WebhookRecorder,
    metrics: Arc<dyn ReleaseMetrics>,
    settings: Arc<ReleaseFlowSettings>,
    locks: KeyedLocks,
}

impl BuildEngine {
    pub fn new(
        storage: Arc<dyn Storage>,
        client: Arc<dyn RepositoryClient>,
        metrics: Arc<dyn ReleaseMetrics>,
        settings: Arc<ReleaseFlowSettings>,
    ) -> Self {
        Self {
            recorder: WebhookRecorder::new(storage.clone()),
            storage,
            client,
            metrics,
            settings,
            locks: KeyedLocks::new(),
        }
    }

    /// Returns the buildable checks not yet recorded for the commit of `status`.
    ///
    /// The review check is looked up under the approved state; every other check under
    /// the state of `status`. A storage failure counts the check as missing.
    pub async fn missing_checks(
        &self,
        configuration: &Configuration,
        status: &StatusEvent,
    ) -> Vec<String> {
        let mut missing = Vec::new();

        for check in buildable_checks(configuration) {
            let state = if check == REVIEW_CHECK {
                APPROVED_REVIEW_STATE
            } else {
                status.state.as_str()
            };

            match self
                .recorder
                .is_recorded(&configuration.id, &status.sha, &check, state)
                .await
            {
                Ok(true) => {}
                Ok(false) => missing.push(check),
                Err(e) => {
                    warn!(check = %check, error = %e, "Failed to look up check, treating it as missing");
                    missing.push(check);
                }
            }
        }

        missing
    }

    /// Cuts a build for the commit of `status` once all buildable checks are recorded.
    ///
    /// Builds of one repository are cut one at a time. A commit that already has a
    /// build gets it back as [`BuildOutcome::AlreadyBuilt`].
    ///
    /// # Errors
    ///
    /// * `QualityGateIncomplete` if a buildable check is missing. Nothing is stored.
    /// * `NotFound` if no pull request has the commit as its head.
    /// * GitHub or storage failures while creating the release or storing the build.
    #[instrument(skip(self, configuration, status), fields(repository = %configuration.id, sha = %status.sha))]
    pub async fn process_build(
        &self,
        configuration: &Configuration,
        status: &StatusEvent,
    ) -> Result<BuildOutcome, ReleaseFlowError> {
        let _guard = self.locks.lock(&configuration.id).await;

        let missing = self.missing_checks(configuration, status).await;
        if !missing.is_empty() {
            debug!(missing = ?missing, "Quality gate incomplete");
            self.metrics.record_quality_gate_incomplete();
            return Err(ReleaseFlowError::QualityGateIncomplete {
                sha: status.sha.clone(),
                missing,
            });
        }

        match self
            .storage
            .get_build_by_sha(&configuration.id, &status.sha)
            .await
        {
            Ok(existing) => {
                info!(build_id = existing.id, "Commit already built");
                return Ok(BuildOutcome::AlreadyBuilt(existing));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let pull_request = self
            .storage
            .get_pull_request_by_head_sha(&configuration.id, &status.sha)
            .await
            .map_err(|e| ReleaseFlowError::from_lookup(e, "pull request", status.sha.as_str()))?;

        let build = self.cut_build(configuration, &pull_request).await?;
        self.report_build(configuration, &pull_request, &build).await;

        Ok(BuildOutcome::Created(build))
    }

    /// Loads the latest build of a repository, or the initial `0.0.0` build when there
    /// is none or it cannot be read.
    pub async fn latest_build(&self, repository: &str) -> Build {
        let latest = match self.storage.get_latest_build(repository).await {
            Ok(latest) => latest,
            Err(e) => {
                debug!(error = %e, "No latest build, starting from 0.0.0");
                return Build::initial(repository);
            }
        };

        match self.storage.get_build(latest.build_id).await {
            Ok(build) => build,
            Err(e) => {
                warn!(build_id = latest.build_id, error = %e, "Latest build unreadable, starting from 0.0.0");
                Build::initial(repository)
            }
        }
    }

    async fn cut_build(
        &self,
        configuration: &Configuration,
        pull_request: &PullRequest,
    ) -> Result<Build, ReleaseFlowError> {
        let (increment, build_type) =
            increment_policy(&pull_request.base_ref, &pull_request.head_ref);
        let previous = self.latest_build(&configuration.id).await;

        let pre_release = match build_type {
            BuildType::Test => self.settings.test_build_pre_release.clone(),
            BuildType::Productive => None,
        };
        let version = previous
            .version()
            .bump(increment)
            .with_pre_release(pre_release);

        let release = self
            .client
            .create_release(
                &configuration.owner,
                &configuration.name,
                &ReleaseRequest {
                    tag_name: version.tag_name(),
                    target_commitish: pull_request.head_sha.clone(),
                    name: version.tag_name(),
                    body: pull_request.title.clone(),
                    draft: false,
                    prerelease: build_type == BuildType::Test,
                },
            )
            .await?;

        let mut build = Build::initial(&configuration.id);
        build.sha = pull_request.head_sha.clone();
        build.major = version.major;
        build.minor = version.minor;
        build.patch = version.patch;
        build.pre_release = version.pre_release.clone();
        build.status = BuildStatus::Finished;
        build.branch = pull_request.head_ref.clone();
        build.username = pull_request.creator.clone();
        build.build_type = build_type;
        build.body = pull_request.body.clone();
        build.github_release_id = Some(release.id);
        build.github_url = Some(release.html_url);

        build.id = self.storage.insert_build(&build).await?;
        self.storage
            .upsert_latest_build(&LatestBuild::new(&configuration.id, build.id))
            .await?;

        self.metrics.record_build_created(build_type.as_str());
        info!(
            build_id = build.id,
            version = %version,
            previous = %previous.version(),
            build_type = build_type.as_str(),
            "Cut build"
        );

        Ok(build)
    }

    async fn report_build(
        &self,
        configuration: &Configuration,
        pull_request: &PullRequest,
        build: &Build,
    ) {
        let body = build.report(&self.settings.build_report_base_url);
        if let Err(e) = self
            .client
            .create_issue_comment(
                &configuration.owner,
                &configuration.name,
                pull_request.number,
                &body,
            )
            .await
        {
            warn!(
                build_id = build.id,
                pull_request = pull_request.number,
                error = %e,
                "Failed to post build report"
            );
        }
    }
}
