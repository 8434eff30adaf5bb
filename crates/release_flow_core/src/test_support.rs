//! Test doubles shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use github_client::models::{Branch, CommitRef, IssueComment, Release};
use github_client::{BranchProtectionRequest, CommitStatus, Error, ReleaseRequest, RepositoryClient};

use crate::build::{Build, LatestBuild};
use crate::configuration::{Configuration, ConfigurationRequest, WorkflowType};
use crate::errors::StorageError;
use crate::memory_store::InMemoryStore;
use crate::pull_request::PullRequest;
use crate::storage::Storage;
use crate::webhook::Webhook;

pub const OWNER: &str = "octocat";
pub const REPO: &str = "hello-world";
pub const FULL_NAME: &str = "octocat/hello-world";

pub fn configuration(checks: &[&str]) -> Configuration {
    Configuration::from_request(ConfigurationRequest {
        owner: OWNER.to_string(),
        name: REPO.to_string(),
        required_status_checks: checks.iter().map(|c| c.to_string()).collect(),
        workflow_type: WorkflowType::Gitflow,
        coverage_threshold: 80.0,
    })
    .unwrap()
}

/// In-memory stand-in for GitHub that records every call.
#[derive(Default)]
pub struct MockRepositoryClient {
    pub branches: Mutex<HashMap<String, String>>,
    pub created_branches: Mutex<Vec<(String, String)>>,
    pub protected: Mutex<Vec<String>>,
    pub unprotected: Mutex<Vec<String>>,
    pub default_branch: Mutex<Option<String>>,
    pub statuses: Mutex<Vec<(String, CommitStatus)>>,
    pub comments: Mutex<Vec<(u64, String)>>,
    pub releases: Mutex<Vec<ReleaseRequest>>,
    /// Branches whose protection keeps answering 404, even after creation.
    pub unreachable: Mutex<HashSet<String>>,
    /// Branches whose protection fails with a server error.
    pub broken: Mutex<HashSet<String>>,
    pub fail_comments: AtomicBool,
    pub fail_releases: AtomicBool,
    pub fail_statuses: AtomicBool,
}

impl MockRepositoryClient {
    pub fn with_branches(names: &[&str]) -> Self {
        let client = Self::default();
        {
            let mut branches = client.branches.lock().unwrap();
            for (i, name) in names.iter().enumerate() {
                branches.insert(name.to_string(), format!("sha-{}-{}", name, i));
            }
        }
        client
    }

    pub fn protected(&self) -> Vec<String> {
        self.protected.lock().unwrap().clone()
    }

    pub fn created_branches(&self) -> Vec<(String, String)> {
        self.created_branches.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<(String, CommitStatus)> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn comments(&self) -> Vec<(u64, String)> {
        self.comments.lock().unwrap().clone()
    }

    pub fn releases(&self) -> Vec<ReleaseRequest> {
        self.releases.lock().unwrap().clone()
    }

    fn branch_sha(&self, branch: &str) -> Option<String> {
        self.branches.lock().unwrap().get(branch).cloned()
    }
}

#[async_trait]
impl RepositoryClient for MockRepositoryClient {
    async fn get_branch(&self, _owner: &str, _repo: &str, branch: &str) -> Result<Branch, Error> {
        match self.branch_sha(branch) {
            Some(sha) => Ok(Branch {
                name: branch.to_string(),
                commit: CommitRef { sha },
                protected: self.protected.lock().unwrap().iter().any(|b| b == branch),
            }),
            None => Err(Error::BranchNotFound {
                branch: branch.to_string(),
            }),
        }
    }

    async fn create_branch(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
        sha: &str,
    ) -> Result<(), Error> {
        self.branches
            .lock()
            .unwrap()
            .insert(branch.to_string(), sha.to_string());
        self.created_branches
            .lock()
            .unwrap()
            .push((branch.to_string(), sha.to_string()));
        Ok(())
    }

    async fn protect_branch(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
        _protection: &BranchProtectionRequest,
    ) -> Result<(), Error> {
        if self.broken.lock().unwrap().contains(branch) {
            return Err(Error::InvalidResponse);
        }
        if self.unreachable.lock().unwrap().contains(branch) || self.branch_sha(branch).is_none() {
            return Err(Error::BranchNotFound {
                branch: branch.to_string(),
            });
        }
        self.protected.lock().unwrap().push(branch.to_string());
        Ok(())
    }

    async fn unprotect_branch(&self, _owner: &str, _repo: &str, branch: &str) -> Result<(), Error> {
        if self.branch_sha(branch).is_none() {
            return Err(Error::BranchNotFound {
                branch: branch.to_string(),
            });
        }
        self.unprotected.lock().unwrap().push(branch.to_string());
        Ok(())
    }

    async fn set_default_branch(
        &self,
        _owner: &str,
        _repo: &str,
        branch: &str,
    ) -> Result<(), Error> {
        *self.default_branch.lock().unwrap() = Some(branch.to_string());
        Ok(())
    }

    async fn create_status(
        &self,
        _owner: &str,
        _repo: &str,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<(), Error> {
        if self.fail_statuses.load(Ordering::SeqCst) {
            return Err(Error::InvalidResponse);
        }
        self.statuses
            .lock()
            .unwrap()
            .push((sha.to_string(), status.clone()));
        Ok(())
    }

    async fn create_issue_comment(
        &self,
        owner: &str,
        repo: &str,
        issue_number: u64,
        body: &str,
    ) -> Result<IssueComment, Error> {
        if self.fail_comments.load(Ordering::SeqCst) {
            return Err(Error::InvalidResponse);
        }
        let mut comments = self.comments.lock().unwrap();
        comments.push((issue_number, body.to_string()));
        Ok(IssueComment {
            id: comments.len() as u64,
            html_url: format!(
                "https://github.com/{}/{}/pull/{}#issuecomment-{}",
                owner,
                repo,
                issue_number,
                comments.len()
            ),
        })
    }

    async fn create_release(
        &self,
        owner: &str,
        repo: &str,
        release: &ReleaseRequest,
    ) -> Result<Release, Error> {
        if self.fail_releases.load(Ordering::SeqCst) {
            return Err(Error::InvalidResponse);
        }
        let mut releases = self.releases.lock().unwrap();
        releases.push(release.clone());
        Ok(Release {
            id: releases.len() as u64,
            tag_name: release.tag_name.clone(),
            html_url: format!(
                "https://github.com/{}/{}/releases/tag/{}",
                owner, repo, release.tag_name
            ),
        })
    }
}

/// In-memory store whose webhook lookups fail with a backend error for chosen ids.
#[derive(Default)]
pub struct FaultyStore {
    pub inner: InMemoryStore,
    failing_webhooks: Mutex<HashSet<String>>,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_webhook_lookup(&self, id: &str) {
        self.failing_webhooks.lock().unwrap().insert(id.to_string());
    }
}

#[async_trait]
impl Storage for FaultyStore {
    async fn get_configuration(&self, id: &str) -> Result<Configuration, StorageError> {
        self.inner.get_configuration(id).await
    }
    async fn insert_configuration(&self, c: &Configuration) -> Result<(), StorageError> {
        self.inner.insert_configuration(c).await
    }
    async fn update_configuration(&self, c: &Configuration) -> Result<(), StorageError> {
        self.inner.update_configuration(c).await
    }
    async fn delete_configuration(&self, id: &str) -> Result<(), StorageError> {
        self.inner.delete_configuration(id).await
    }
    async fn delete_required_status_checks(&self, id: &str) -> Result<(), StorageError> {
        self.inner.delete_required_status_checks(id).await
    }
    async fn get_webhook(&self, id: &str) -> Result<Webhook, StorageError> {
        if self.failing_webhooks.lock().unwrap().contains(id) {
            return Err(StorageError::Backend("connection reset".to_string()));
        }
        self.inner.get_webhook(id).await
    }
    async fn insert_webhook(&self, webhook: &Webhook) -> Result<(), StorageError> {
        self.inner.insert_webhook(webhook).await
    }
    async fn delete_webhook(&self, id: &str) -> Result<(), StorageError> {
        self.inner.delete_webhook(id).await
    }
    async fn get_pull_request(&self, id: u64) -> Result<PullRequest, StorageError> {
        self.inner.get_pull_request(id).await
    }
    async fn get_pull_request_by_head_sha(
        &self,
        repository: &str,
        sha: &str,
    ) -> Result<PullRequest, StorageError> {
        self.inner.get_pull_request_by_head_sha(repository, sha).await
    }
    async fn insert_pull_request(&self, pr: &PullRequest) -> Result<(), StorageError> {
        self.inner.insert_pull_request(pr).await
    }
    async fn update_pull_request(&self, pr: &PullRequest) -> Result<(), StorageError> {
        self.inner.update_pull_request(pr).await
    }
    async fn get_build(&self, id: u64) -> Result<Build, StorageError> {
        self.inner.get_build(id).await
    }
    async fn get_build_by_sha(&self, repository: &str, sha: &str) -> Result<Build, StorageError> {
        self.inner.get_build_by_sha(repository, sha).await
    }
    async fn insert_build(&self, build: &Build) -> Result<u64, StorageError> {
        self.inner.insert_build(build).await
    }
    async fn get_latest_build(&self, repository: &str) -> Result<LatestBuild, StorageError> {
        self.inner.get_latest_build(repository).await
    }
    async fn upsert_latest_build(&self, latest: &LatestBuild) -> Result<(), StorageError> {
        self.inner.upsert_latest_build(latest).await
    }
}
