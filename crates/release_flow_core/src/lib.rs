//! # Release Flow Core
//!
//! This crate implements the release automation of a repository that follows a gitflow
//! branching model. It reacts to GitHub webhooks and drives the repository through
//! GitHub's API.
//!
//! ## Overview
//!
//! A repository is enrolled with a [`Configuration`] listing the status checks that must
//! pass before a build is cut. From then on:
//! 1. Every inbound event is recorded at most once ([`webhook`]).
//! 2. Pull requests are checked against the workflow and the verdict is published as a
//!    commit status ([`workflow`]).
//! 3. Once every required check and an approval are recorded for a commit, a build is
//!    versioned, released and reported on the pull request ([`build_engine`]).
//! 4. Enrollment protects the long lived branches and creates the ones that are
//!    missing ([`protection`]).
//!
//! ## Architecture
//!
//! The crate follows a dependency injection pattern for testability:
//! - [`RepositoryClient`](github_client::RepositoryClient) for GitHub API operations
//! - [`Storage`] for persistence, with [`InMemoryStore`] as the bundled implementation
//! - [`ReleaseMetrics`] for counters, with Prometheus and no-op implementations
//!
//! [`ReleaseFlow`] wires these into the two services used by the API layer.
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use github_client::{create_token_client, GitHubClient};
//! use release_flow_core::{
//!     ConfigurationRequest, InMemoryStore, NoOpReleaseMetrics, ReleaseFlow, ReleaseFlowSettings,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let octocrab = create_token_client("ghp_example", None)?;
//! let flow = ReleaseFlow::new(
//!     Arc::new(InMemoryStore::new()),
//!     Arc::new(GitHubClient::new(octocrab)),
//!     Arc::new(NoOpReleaseMetrics::new()),
//!     ReleaseFlowSettings::default(),
//! );
//!
//! let outcome = flow
//!     .configurations
//!     .create(ConfigurationRequest {
//!         owner: "octocat".to_string(),
//!         name: "hello-world".to_string(),
//!         required_status_checks: vec!["workflow".to_string(), "ci".to_string()],
//!         workflow_type: Default::default(),
//!         coverage_threshold: 80.0,
//!     })
//!     .await?;
//! println!("Enrolled {}", outcome.configuration.id);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use github_client::RepositoryClient;

pub mod build;
pub mod build_engine;
pub mod configuration;
pub mod configuration_service;
pub mod errors;
pub mod locks;
pub mod memory_store;
pub mod metrics;
pub mod protection;
pub mod pull_request;
pub mod settings;
pub mod storage;
pub mod webhook;
pub mod webhook_service;
pub mod workflow;

#[cfg(test)]
mod test_support;

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

pub use build::{Build, BuildStatus, BuildType, Increment, LatestBuild, SemanticVersion};
pub use build_engine::{BuildEngine, BuildOutcome};
pub use configuration::{Configuration, ConfigurationRequest, ConfigurationUpdate, WorkflowType};
pub use configuration_service::{ConfigurationService, CreateOutcome};
pub use errors::{ErrorKind, ReleaseFlowError, SettingsError, StorageError, ValidationError};
pub use memory_store::InMemoryStore;
pub use metrics::{NoOpReleaseMetrics, PrometheusReleaseMetrics, ReleaseMetrics};
pub use protection::BranchProtectionOrchestrator;
pub use pull_request::PullRequest;
pub use settings::ReleaseFlowSettings;
pub use storage::Storage;
pub use webhook::{Webhook, WebhookRecorder};
pub use webhook_service::{BuildProgress, WebhookOutcome, WebhookService};
pub use workflow::{check_workflow, Verdict, WorkflowCheck, WorkflowDefinition};

/// The services of the release flow, sharing one store and one GitHub client.
pub struct ReleaseFlow {
    pub webhooks: Arc<WebhookService>,
    pub configurations: Arc<ConfigurationService>,
}

impl ReleaseFlow {
    pub fn new(
        storage: Arc<dyn Storage>,
        client: Arc<dyn RepositoryClient>,
        metrics: Arc<dyn ReleaseMetrics>,
        settings: ReleaseFlowSettings,
    ) -> Self {
        let protection = BranchProtectionOrchestrator::new(client.clone())
            .with_max_attempts(settings.max_protection_attempts);
        let settings = Arc::new(settings);

        Self {
            webhooks: Arc::new(WebhookService::new(
                storage.clone(),
                client,
                metrics,
                settings,
            )),
            configurations: Arc::new(ConfigurationService::new(storage, protection)),
        }
    }
}
