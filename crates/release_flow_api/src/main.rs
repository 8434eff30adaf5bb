//! Release flow REST API server
//!
//! Main binary for running the API server in production or development.
//!
//! # Environment Variables
//!
//! - `API_PORT`: Port to listen on (default: 8080)
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `RUST_LOG`: Log level (default: info)
//! - `RELEASE_FLOW_CONFIG`: Path to a TOML settings file (optional)
//! - `GITHUB_API_URL`: GitHub API base URL, for GitHub Enterprise (optional)
//! - `GITHUB_TOKEN`: Token used to call GitHub, or
//! - `GITHUB_APP_ID`, `GITHUB_APP_PRIVATE_KEY` and `GITHUB_INSTALLATION_ID` to act as a
//!   GitHub App installation

use std::{env, path::Path, sync::Arc};

use anyhow::Context;
use github_client::{
    authenticate_with_access_token, create_app_client, create_token_client, GitHubClient,
};
use prometheus::Registry;
use release_flow_api::{ApiConfig, ApiServer, AppState, API_VERSION};
use release_flow_core::{InMemoryStore, ReleaseFlowSettings};
use secrecy::{ExposeSecret, SecretString};

fn secret_var(name: &str) -> Option<SecretString> {
    env::var(name)
        .ok()
        .filter(|value| !value.is_empty())
        .map(SecretString::from)
}

fn parse_var<T>(name: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    env::var(name)
        .with_context(|| format!("{} is not set", name))?
        .parse()
        .with_context(|| format!("Invalid {}", name))
}

fn load_settings() -> anyhow::Result<ReleaseFlowSettings> {
    let settings = match env::var("RELEASE_FLOW_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading settings from {}", path);
            ReleaseFlowSettings::load(Path::new(&path))?
        }
        Err(_) => ReleaseFlowSettings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

async fn github_client() -> anyhow::Result<GitHubClient> {
    let api_url = env::var("GITHUB_API_URL").ok();

    let octocrab = if let Some(token) = secret_var("GITHUB_TOKEN") {
        tracing::info!("Authenticating to GitHub with a token");
        create_token_client(token.expose_secret(), api_url.as_deref())?
    } else {
        let app_id: u64 = parse_var("GITHUB_APP_ID")
            .context("Set GITHUB_TOKEN or the GITHUB_APP_* variables")?;
        let installation_id: u64 = parse_var("GITHUB_INSTALLATION_ID")?;
        let private_key =
            secret_var("GITHUB_APP_PRIVATE_KEY").context("GITHUB_APP_PRIVATE_KEY is not set")?;

        tracing::info!(app_id, installation_id, "Authenticating to GitHub as an app");
        let app_client = create_app_client(app_id, private_key.expose_secret()).await?;
        authenticate_with_access_token(&app_client, installation_id).await?
    };

    Ok(GitHubClient::new(octocrab))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()))
        .init();

    // Load configuration from environment
    let config = ApiConfig::from_env()?;
    let settings = load_settings()?;
    let client = github_client().await?;

    let state = AppState::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(client),
        settings,
        Registry::new(),
    )?;
    tracing::info!(
        api_version = API_VERSION,
        host = %config.host,
        port = config.port,
        "Starting release flow API server"
    );
    let server = ApiServer::new(config, state);

    // Start server with graceful shutdown
    server.serve().await
}
