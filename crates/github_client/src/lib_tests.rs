// Tests for the GitHubClient implementation of RepositoryClient

use super::*; // Import items from lib.rs
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OWNER: &str = "octocat";
const REPO: &str = "hello-world";

fn client_for(mock_server: &MockServer) -> GitHubClient {
    let octocrab = octocrab::Octocrab::builder()
        .base_uri(mock_server.uri())
        .unwrap()
        .personal_token("test-token".to_string())
        .build()
        .unwrap();
    GitHubClient::new(octocrab)
}

fn gitflow_protection() -> BranchProtectionRequest {
    BranchProtectionRequest {
        required_status_checks: Some(RequiredStatusChecks {
            strict: true,
            contexts: vec!["ci".to_string(), "workflow".to_string()],
        }),
        enforce_admins: true,
        required_pull_request_reviews: None,
        restrictions: None,
    }
}

#[tokio::test]
async fn test_get_branch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/develop")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "develop",
            "commit": { "sha": "6dcb09b5b57875f334f61aebed695e2e4193db5e" },
            "protected": false
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let branch = client.get_branch(OWNER, REPO, "develop").await.unwrap();

    assert_eq!(branch.name, "develop");
    assert_eq!(branch.commit.sha, "6dcb09b5b57875f334f61aebed695e2e4193db5e");
}

#[tokio::test]
async fn test_get_branch_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/develop")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Branch not found",
            "documentation_url": "https://docs.github.com/rest/branches/branches#get-a-branch"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.get_branch(OWNER, REPO, "develop").await;

    match result {
        Err(Error::BranchNotFound { branch }) => assert_eq!(branch, "develop"),
        other => panic!("Expected BranchNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_branch_from_uses_source_tip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/master")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "master",
            "commit": { "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(format!("/repos/{OWNER}/{REPO}/git/refs")))
        .and(body_partial_json(json!({
            "ref": "refs/heads/develop",
            "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ref": "refs/heads/develop",
            "object": { "sha": "aa218f56b14c9653891f9e74264a383fa43fefbd", "type": "commit" }
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .create_branch_from(OWNER, REPO, "develop", "master")
        .await;

    if let Err(e) = &result {
        eprintln!("create_branch_from error: {e:?}");
    }
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_branch_from_missing_source() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/master")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Branch not found"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .create_branch_from(OWNER, REPO, "develop", "master")
        .await;

    assert!(matches!(result, Err(Error::BranchNotFound { branch }) if branch == "master"));
}

#[tokio::test]
async fn test_protect_branch_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/master/protection")))
        .and(body_partial_json(json!({
            "enforce_admins": true,
            "required_status_checks": { "strict": true, "contexts": ["ci", "workflow"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://api.github.com/repos/octocat/hello-world/branches/master/protection"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .protect_branch(OWNER, REPO, "master", &gitflow_protection())
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_protect_branch_missing_branch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/develop/protection")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Branch not found",
            "documentation_url": "https://docs.github.com/rest/branches/branch-protection"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .protect_branch(OWNER, REPO, "develop", &gitflow_protection())
        .await;

    let err = result.unwrap_err();
    assert!(err.is_branch_not_found(), "unexpected error: {err:?}");
}

#[tokio::test]
async fn test_protect_branch_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/master/protection")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .protect_branch(OWNER, REPO, "master", &gitflow_protection())
        .await;

    match result {
        Err(Error::BadRequest(message)) => assert_eq!(message, "Validation Failed"),
        other => panic!("Expected BadRequest, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unprotect_branch_no_content() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/develop/protection")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.unprotect_branch(OWNER, REPO, "develop").await;

    if let Err(e) = &result {
        eprintln!("unprotect_branch error: {e:?}");
    }
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_unprotect_branch_missing_branch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/develop/protection")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Branch not protected"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.unprotect_branch(OWNER, REPO, "develop").await;

    assert!(result.unwrap_err().is_branch_not_found());
}

#[tokio::test]
async fn test_set_default_branch() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path(format!("/repos/{OWNER}/{REPO}")))
        .and(body_partial_json(json!({ "default_branch": "develop" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1296269,
            "name": REPO,
            "full_name": format!("{OWNER}/{REPO}"),
            "default_branch": "develop"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client.set_default_branch(OWNER, REPO, "develop").await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_status() {
    let mock_server = MockServer::start().await;
    let sha = "6dcb09b5b57875f334f61aebed695e2e4193db5e";

    Mock::given(method("POST"))
        .and(path(format!("/repos/{OWNER}/{REPO}/statuses/{sha}")))
        .and(body_partial_json(json!({
            "state": "failure",
            "context": "workflow",
            "description": "Oops! You're not complying with the workflow."
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "state": "failure",
            "context": "workflow"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let status = CommitStatus {
        state: StatusState::Failure,
        target_url: None,
        description: Some("Oops! You're not complying with the workflow.".to_string()),
        context: "workflow".to_string(),
    };

    let result = client.create_status(OWNER, REPO, sha, &status).await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_create_issue_comment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/repos/{OWNER}/{REPO}/issues/7/comments")))
        .and(body_partial_json(json!({ "body": "# Build report" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1,
            "html_url": "https://github.com/octocat/hello-world/pull/7#issuecomment-1",
            "body": "# Build report"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let comment = client
        .create_issue_comment(OWNER, REPO, 7, "# Build report")
        .await
        .unwrap();

    assert_eq!(comment.id, 1);
}

#[tokio::test]
async fn test_create_release() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/repos/{OWNER}/{REPO}/releases")))
        .and(body_partial_json(json!({
            "tag_name": "v1.3.0",
            "target_commitish": "master",
            "prerelease": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 42,
            "tag_name": "v1.3.0",
            "html_url": "https://github.com/octocat/hello-world/releases/tag/v1.3.0"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = ReleaseRequest {
        tag_name: "v1.3.0".to_string(),
        target_commitish: "master".to_string(),
        name: "v1.3.0".to_string(),
        ..Default::default()
    };

    let release = client.create_release(OWNER, REPO, &request).await.unwrap();

    assert_eq!(release.id, 42);
    assert_eq!(
        release.html_url,
        "https://github.com/octocat/hello-world/releases/tag/v1.3.0"
    );
}

#[tokio::test]
async fn test_create_release_existing_tag() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(format!("/repos/{OWNER}/{REPO}/releases")))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "Validation Failed",
            "errors": [{ "resource": "Release", "code": "already_exists", "field": "tag_name" }]
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let request = ReleaseRequest {
        tag_name: "v1.3.0".to_string(),
        target_commitish: "master".to_string(),
        name: "v1.3.0".to_string(),
        ..Default::default()
    };

    let result = client.create_release(OWNER, REPO, &request).await;

    assert!(matches!(result, Err(Error::BadRequest(_))));
}

#[tokio::test]
async fn test_create_app_client_rejects_invalid_key() {
    let result = create_app_client(12345, "not a pem key").await;

    assert!(matches!(result, Err(Error::AuthError(_))));
}

#[tokio::test]
async fn test_create_token_client_with_base_uri() {
    let mock_server = MockServer::start().await;

    let result = create_token_client("test-token", Some(&mock_server.uri()));

    assert!(result.is_ok());
}

#[tokio::test]
#[traced_test]
async fn test_protect_missing_branch_logs_at_debug() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/develop/protection")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "message": "Branch not found"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .protect_branch(
            OWNER,
            REPO,
            "develop",
            &gitflow_protection(),
        )
        .await;

    assert!(result.unwrap_err().is_branch_not_found());
    assert!(logs_contain("Branch not found on GitHub"));
    assert!(!logs_contain("Received an error from GitHub"));
}

#[tokio::test]
#[traced_test]
async fn test_server_error_is_logged_as_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path(format!("/repos/{OWNER}/{REPO}/branches/develop/protection")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "message": "Server Error"
        })))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let result = client
        .protect_branch(
            OWNER,
            REPO,
            "develop",
            &gitflow_protection(),
        )
        .await;

    assert!(result.is_err());
    assert!(logs_contain("Received an error from GitHub"));
}
