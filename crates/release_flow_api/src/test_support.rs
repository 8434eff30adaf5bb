//! Shared fixtures for the HTTP tests.

use std::sync::Arc;

use github_client::{create_token_client, GitHubClient};
use prometheus::Registry;
use release_flow_core::{InMemoryStore, ReleaseFlowSettings};

use crate::AppState;

/// Application state backed by an in-memory store and a GitHub client pointed at
/// `github_uri`.
pub fn test_state(github_uri: &str) -> (Arc<InMemoryStore>, AppState) {
    let store = Arc::new(InMemoryStore::new());
    let octocrab =
        create_token_client("test-token", Some(github_uri)).expect("Failed to build client");
    let state = AppState::new(
        store.clone(),
        Arc::new(GitHubClient::new(octocrab)),
        ReleaseFlowSettings::default(),
        Registry::new(),
    )
    .expect("Failed to register metrics");
    (store, state)
}
