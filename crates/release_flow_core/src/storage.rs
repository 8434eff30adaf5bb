//! Storage contract.
//!
//! The release flow persists configurations, webhook dedup records, pull requests,
//! builds and the per-repository latest-build pointer through [`Storage`]. Lookups
//! report a missing row as [`StorageError::NotFound`]; inserts report a key collision
//! as [`StorageError::Duplicate`].

use async_trait::async_trait;

use crate::build::{Build, LatestBuild};
use crate::configuration::Configuration;
use crate::errors::StorageError;
use crate::pull_request::PullRequest;
use crate::webhook::Webhook;

/// Persistence operations used by the release flow.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_configuration(&self, id: &str) -> Result<Configuration, StorageError>;
    async fn insert_configuration(&self, configuration: &Configuration)
        -> Result<(), StorageError>;
    async fn update_configuration(&self, configuration: &Configuration)
        -> Result<(), StorageError>;
    async fn delete_configuration(&self, id: &str) -> Result<(), StorageError>;

    /// Removes the required status check rows belonging to a configuration.
    async fn delete_required_status_checks(
        &self,
        configuration_id: &str,
    ) -> Result<(), StorageError>;

    async fn get_webhook(&self, id: &str) -> Result<Webhook, StorageError>;
    async fn insert_webhook(&self, webhook: &Webhook) -> Result<(), StorageError>;
    async fn delete_webhook(&self, id: &str) -> Result<(), StorageError>;

    async fn get_pull_request(&self, id: u64) -> Result<PullRequest, StorageError>;

    /// Finds the pull request of a repository whose head is at `sha`.
    async fn get_pull_request_by_head_sha(
        &self,
        repository: &str,
        sha: &str,
    ) -> Result<PullRequest, StorageError>;
    async fn insert_pull_request(&self, pull_request: &PullRequest) -> Result<(), StorageError>;
    async fn update_pull_request(&self, pull_request: &PullRequest) -> Result<(), StorageError>;

    async fn get_build(&self, id: u64) -> Result<Build, StorageError>;
    async fn get_build_by_sha(&self, repository: &str, sha: &str)
        -> Result<Build, StorageError>;

    /// Inserts a build and returns the id assigned to it.
    async fn insert_build(&self, build: &Build) -> Result<u64, StorageError>;

    async fn get_latest_build(&self, repository: &str) -> Result<LatestBuild, StorageError>;

    /// Replaces the latest-build pointer of a repository in one step.
    async fn upsert_latest_build(&self, latest: &LatestBuild) -> Result<(), StorageError>;
}
