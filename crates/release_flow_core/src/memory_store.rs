//! In-memory storage implementation.
//!
//! This module provides [`InMemoryStore`], a simple in-memory implementation of the
//! [`Storage`] trait used by the API binary and the tests.
//!
//! ## Limitations
//!
//! - **NOT suitable for production**: No durability, no cross-process coordination
//! - **No persistence**: All state is lost when the process exits

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;

use crate::build::{Build, LatestBuild};
use crate::configuration::Configuration;
use crate::errors::StorageError;
use crate::pull_request::PullRequest;
use crate::storage::Storage;
use crate::webhook::Webhook;

#[cfg(test)]
#[path = "memory_store_tests.rs"]
mod tests;

#[derive(Debug, Default)]
struct Tables {
    configurations: HashMap<String, Configuration>,
    webhooks: HashMap<String, Webhook>,
    pull_requests: HashMap<u64, PullRequest>,
    builds: HashMap<u64, Build>,
    latest_builds: HashMap<String, LatestBuild>,
    next_build_id: u64,
}

/// Thread-safe in-memory store guarded by a single `RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

/// Converts a lock poison error to a storage error.
fn poison_err<T>(_: PoisonError<T>) -> StorageError {
    StorageError::Backend("lock poisoned".to_string())
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored builds.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn build_count(&self) -> Result<usize, StorageError> {
        let tables = self.tables.read().map_err(poison_err)?;
        Ok(tables.builds.len())
    }

    /// Returns the number of recorded webhooks.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock is poisoned.
    pub fn webhook_count(&self) -> Result<usize, StorageError> {
        let tables = self.tables.read().map_err(poison_err)?;
        Ok(tables.webhooks.len())
    }
}

#[async_trait]
impl Storage for InMemoryStore {
    async fn get_configuration(&self, id: &str) -> Result<Configuration, StorageError> {
        let tables = self.tables.read().map_err(poison_err)?;
        tables
            .configurations
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("configuration", id))
    }

    async fn insert_configuration(
        &self,
        configuration: &Configuration,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if tables.configurations.contains_key(&configuration.id) {
            return Err(StorageError::duplicate("configuration", &configuration.id));
        }
        tables
            .configurations
            .insert(configuration.id.clone(), configuration.clone());
        Ok(())
    }

    async fn update_configuration(
        &self,
        configuration: &Configuration,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        let Some(existing) = tables.configurations.get_mut(&configuration.id) else {
            return Err(StorageError::not_found("configuration", &configuration.id));
        };
        *existing = configuration.clone();
        Ok(())
    }

    async fn delete_configuration(&self, id: &str) -> Result<(), StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        tables
            .configurations
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("configuration", id))
    }

    async fn delete_required_status_checks(
        &self,
        configuration_id: &str,
    ) -> Result<(), StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if let Some(configuration) = tables.configurations.get_mut(configuration_id) {
            configuration.required_status_checks.clear();
        }
        Ok(())
    }

    async fn get_webhook(&self, id: &str) -> Result<Webhook, StorageError> {
        let tables = self.tables.read().map_err(poison_err)?;
        tables
            .webhooks
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("webhook", id))
    }

    async fn insert_webhook(&self, webhook: &Webhook) -> Result<(), StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if tables.webhooks.contains_key(&webhook.id) {
            return Err(StorageError::duplicate("webhook", &webhook.id));
        }
        tables.webhooks.insert(webhook.id.clone(), webhook.clone());
        Ok(())
    }

    async fn delete_webhook(&self, id: &str) -> Result<(), StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        tables
            .webhooks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found("webhook", id))
    }

    async fn get_pull_request(&self, id: u64) -> Result<PullRequest, StorageError> {
        let tables = self.tables.read().map_err(poison_err)?;
        tables
            .pull_requests
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("pull request", id.to_string()))
    }

    async fn get_pull_request_by_head_sha(
        &self,
        repository: &str,
        sha: &str,
    ) -> Result<PullRequest, StorageError> {
        let tables = self.tables.read().map_err(poison_err)?;
        tables
            .pull_requests
            .values()
            .filter(|pr| pr.repository == repository && pr.head_sha == sha)
            .max_by_key(|pr| pr.updated_at)
            .cloned()
            .ok_or_else(|| StorageError::not_found("pull request", sha))
    }

    async fn insert_pull_request(&self, pull_request: &PullRequest) -> Result<(), StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        if tables.pull_requests.contains_key(&pull_request.id) {
            return Err(StorageError::duplicate(
                "pull request",
                pull_request.id.to_string(),
            ));
        }
        tables
            .pull_requests
            .insert(pull_request.id, pull_request.clone());
        Ok(())
    }

    async fn update_pull_request(&self, pull_request: &PullRequest) -> Result<(), StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        let Some(existing) = tables.pull_requests.get_mut(&pull_request.id) else {
            return Err(StorageError::not_found(
                "pull request",
                pull_request.id.to_string(),
            ));
        };
        *existing = pull_request.clone();
        Ok(())
    }

    async fn get_build(&self, id: u64) -> Result<Build, StorageError> {
        let tables = self.tables.read().map_err(poison_err)?;
        tables
            .builds
            .get(&id)
            .cloned()
            .ok_or_else(|| StorageError::not_found("build", id.to_string()))
    }

    async fn get_build_by_sha(&self, repository: &str, sha: &str) -> Result<Build, StorageError> {
        let tables = self.tables.read().map_err(poison_err)?;
        tables
            .builds
            .values()
            .find(|b| b.repository == repository && b.sha == sha)
            .cloned()
            .ok_or_else(|| StorageError::not_found("build", sha))
    }

    async fn insert_build(&self, build: &Build) -> Result<u64, StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        tables.next_build_id += 1;
        let id = tables.next_build_id;

        let mut stored = build.clone();
        stored.id = id;
        tables.builds.insert(id, stored);
        Ok(id)
    }

    async fn get_latest_build(&self, repository: &str) -> Result<LatestBuild, StorageError> {
        let tables = self.tables.read().map_err(poison_err)?;
        tables
            .latest_builds
            .get(repository)
            .cloned()
            .ok_or_else(|| StorageError::not_found("latest build", repository))
    }

    async fn upsert_latest_build(&self, latest: &LatestBuild) -> Result<(), StorageError> {
        let mut tables = self.tables.write().map_err(poison_err)?;
        tables
            .latest_builds
            .insert(latest.repository.clone(), latest.clone());
        Ok(())
    }
}
