use super::*;
use crate::build::BuildStatus;
use crate::configuration::{ConfigurationRequest, WorkflowType};
use chrono::{Duration, Utc};
use github_client::WebhookEvent;

fn configuration() -> Configuration {
    Configuration::from_request(ConfigurationRequest {
        owner: "octocat".to_string(),
        name: "hello-world".to_string(),
        required_status_checks: vec!["workflow".to_string(), "ci".to_string()],
        workflow_type: WorkflowType::Gitflow,
        coverage_threshold: 80.0,
    })
    .unwrap()
}

fn webhook(id: &str) -> Webhook {
    Webhook {
        id: id.to_string(),
        event: WebhookEvent::Status,
        repository: "octocat/hello-world".to_string(),
        sender: "ci-bot".to_string(),
        sha: "abc".to_string(),
        context: "ci".to_string(),
        state: "success".to_string(),
        description: None,
        pull_request_number: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

fn pull_request(id: u64, head_sha: &str) -> PullRequest {
    PullRequest {
        id,
        number: id,
        state: "opened".to_string(),
        repository: "octocat/hello-world".to_string(),
        base_ref: "master".to_string(),
        base_sha: "aaa".to_string(),
        head_ref: "release/1.2".to_string(),
        head_sha: head_sha.to_string(),
        title: None,
        body: None,
        creator: "octocat".to_string(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_configuration_crud() {
    let store = InMemoryStore::new();
    let config = configuration();

    store.insert_configuration(&config).await.unwrap();
    assert_eq!(store.get_configuration(&config.id).await.unwrap(), config);

    let mut updated = config.clone();
    updated.coverage_threshold = 90.0;
    store.update_configuration(&updated).await.unwrap();
    assert_eq!(
        store.get_configuration(&config.id).await.unwrap().coverage_threshold,
        90.0
    );

    store.delete_configuration(&config.id).await.unwrap();
    assert!(store
        .get_configuration(&config.id)
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_configuration_duplicate_insert() {
    let store = InMemoryStore::new();
    let config = configuration();
    store.insert_configuration(&config).await.unwrap();

    let result = store.insert_configuration(&config).await;

    assert!(matches!(result, Err(StorageError::Duplicate { .. })));
}

#[tokio::test]
async fn test_update_missing_configuration_is_not_found() {
    let store = InMemoryStore::new();

    let result = store.update_configuration(&configuration()).await;

    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_delete_required_status_checks() {
    let store = InMemoryStore::new();
    let config = configuration();
    store.insert_configuration(&config).await.unwrap();

    store.delete_required_status_checks(&config.id).await.unwrap();

    let stored = store.get_configuration(&config.id).await.unwrap();
    assert!(stored.required_status_checks.is_empty());
}

#[tokio::test]
async fn test_webhook_insert_get_delete() {
    let store = InMemoryStore::new();

    store.insert_webhook(&webhook("w1")).await.unwrap();
    assert_eq!(store.webhook_count().unwrap(), 1);
    assert!(matches!(
        store.insert_webhook(&webhook("w1")).await,
        Err(StorageError::Duplicate { .. })
    ));

    store.delete_webhook("w1").await.unwrap();
    assert!(store.get_webhook("w1").await.unwrap_err().is_not_found());
    assert!(store.delete_webhook("w1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_pull_request_by_head_sha_prefers_latest_update() {
    let store = InMemoryStore::new();
    let mut older = pull_request(1, "abc");
    older.updated_at = Utc::now() - Duration::hours(1);
    store.insert_pull_request(&older).await.unwrap();
    store.insert_pull_request(&pull_request(2, "abc")).await.unwrap();
    store.insert_pull_request(&pull_request(3, "def")).await.unwrap();

    let found = store
        .get_pull_request_by_head_sha("octocat/hello-world", "abc")
        .await
        .unwrap();

    assert_eq!(found.id, 2);
    assert!(store
        .get_pull_request_by_head_sha("octocat/other", "abc")
        .await
        .unwrap_err()
        .is_not_found());
}

#[tokio::test]
async fn test_pull_request_update() {
    let store = InMemoryStore::new();
    store.insert_pull_request(&pull_request(1, "abc")).await.unwrap();

    let mut pr = pull_request(1, "def");
    pr.state = "synchronize".to_string();
    store.update_pull_request(&pr).await.unwrap();

    let stored = store.get_pull_request(1).await.unwrap();
    assert_eq!(stored.head_sha, "def");
    assert_eq!(stored.state, "synchronize");
}

#[tokio::test]
async fn test_insert_build_assigns_ids() {
    let store = InMemoryStore::new();
    let mut build = Build::initial("octocat/hello-world");
    build.sha = "abc".to_string();
    build.status = BuildStatus::Finished;

    let first = store.insert_build(&build).await.unwrap();
    build.sha = "def".to_string();
    let second = store.insert_build(&build).await.unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 2);
    assert_eq!(store.get_build(1).await.unwrap().id, 1);
    assert_eq!(
        store
            .get_build_by_sha("octocat/hello-world", "def")
            .await
            .unwrap()
            .id,
        2
    );
    assert_eq!(store.build_count().unwrap(), 2);
}

#[tokio::test]
async fn test_upsert_latest_build_replaces_pointer() {
    let store = InMemoryStore::new();

    assert!(store
        .get_latest_build("octocat/hello-world")
        .await
        .unwrap_err()
        .is_not_found());

    store
        .upsert_latest_build(&LatestBuild::new("octocat/hello-world", 1))
        .await
        .unwrap();
    store
        .upsert_latest_build(&LatestBuild::new("octocat/hello-world", 2))
        .await
        .unwrap();

    let latest = store.get_latest_build("octocat/hello-world").await.unwrap();
    assert_eq!(latest.build_id, 2);
}
