//! Webhook orchestration.
//!
//! [`WebhookService`] is the entry point for inbound GitHub events. Each event is
//! recorded at most once, then, depending on its kind, the workflow verdict is published
//! on the pull request head or the quality gate is evaluated for the commit.
//!
//! The repository configuration is looked up once per event and passed to every
//! component explicitly.

use std::sync::Arc;

use github_client::{
    PullRequestEventPayload, PullRequestReviewEventPayload, RepositoryClient, ReviewState,
    StatusEventPayload, StatusState, WebhookEvent,
};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use crate::build::{Build, APPROVED_REVIEW_STATE, REVIEW_CHECK};
use crate::build_engine::{BuildEngine, BuildOutcome};
use crate::configuration::Configuration;
use crate::errors::{ReleaseFlowError, StorageError, ValidationError};
use crate::metrics::ReleaseMetrics;
use crate::pull_request::PullRequest;
use crate::settings::ReleaseFlowSettings;
use crate::storage::Storage;
use crate::webhook::{RecordOutcome, Webhook, WebhookRecord, WebhookRecorder};
use crate::workflow::{check_workflow, StatusEvent, WorkflowCheck, WorkflowDefinition};

#[cfg(test)]
#[path = "webhook_service_tests.rs"]
mod tests;

/// Pull request actions that are recorded.
const SUPPORTED_PULL_REQUEST_ACTIONS: &[&str] =
    &["opened", "reopened", "synchronize", "edited", "closed"];

/// Pull request actions after which the workflow verdict is published.
const WORKFLOW_CHECKED_ACTIONS: &[&str] = &["opened", "reopened", "synchronize"];

/// What happened to the quality gate while processing an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildProgress {
    /// The event does not trigger the gate.
    NotAttempted,
    /// The gate ran and checks are still missing.
    Pending { missing: Vec<String> },
    Created { build: Build },
    AlreadyBuilt { build: Build },
}

impl From<BuildOutcome> for BuildProgress {
    fn from(outcome: BuildOutcome) -> Self {
        match outcome {
            BuildOutcome::Created(build) => Self::Created { build },
            BuildOutcome::AlreadyBuilt(build) => Self::AlreadyBuilt { build },
        }
    }
}

/// Result of processing one inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookOutcome {
    pub webhook: Webhook,
    /// Workflow verdict published for a pull request event.
    pub workflow: Option<WorkflowCheck>,
    pub build: BuildProgress,
}

impl WebhookOutcome {
    fn recorded(webhook: Webhook) -> Self {
        Self {
            webhook,
            workflow: None,
            build: BuildProgress::NotAttempted,
        }
    }

    /// `true` when the gate ran and is still waiting for checks.
    pub fn is_pending(&self) -> bool {
        matches!(self.build, BuildProgress::Pending { .. })
    }
}

pub struct WebhookService {
    storage: Arc<dyn Storage>,
    client: Arc<dyn RepositoryClient>,
    recorder: WebhookRecorder,
    build_engine: BuildEngine,
    metrics: Arc<dyn ReleaseMetrics>,
    settings: Arc<ReleaseFlowSettings>,
}

impl WebhookService {
    pub fn new(
        storage: Arc<dyn Storage>,
        client: Arc<dyn RepositoryClient>,
        metrics: Arc<dyn ReleaseMetrics>,
        settings: Arc<ReleaseFlowSettings>,
    ) -> Self {
        Self {
            recorder: WebhookRecorder::new(storage.clone()),
            build_engine: BuildEngine::new(
                storage.clone(),
                client.clone(),
                metrics.clone(),
                settings.clone(),
            ),
            storage,
            client,
            metrics,
            settings,
        }
    }

    pub fn build_engine(&self) -> &BuildEngine {
        &self.build_engine
    }

    /// Parses a delivery body according to its event type and processes it.
    ///
    /// # Errors
    ///
    /// Returns a validation error for bodies that do not match the event type, and
    /// otherwise whatever the event handler returns.
    pub async fn dispatch(
        &self,
        event: WebhookEvent,
        body: &[u8],
    ) -> Result<WebhookOutcome, ReleaseFlowError> {
        self.metrics.record_webhook_received(event.as_str());

        match event {
            WebhookEvent::Status => self.handle_status(parse_payload(body)?).await,
            WebhookEvent::PullRequest => self.handle_pull_request(parse_payload(body)?).await,
            WebhookEvent::PullRequestReview => self.handle_review(parse_payload(body)?).await,
        }
    }

    /// Records a commit status and, for successful statuses, evaluates the quality gate.
    #[instrument(skip(self, payload), fields(repository = %payload.repository.full_name, sha = %payload.sha, context = %payload.context))]
    pub async fn handle_status(
        &self,
        payload: StatusEventPayload,
    ) -> Result<WebhookOutcome, ReleaseFlowError> {
        if payload.sha.is_empty() {
            return Err(ValidationError::empty_field("sha").into());
        }
        let configuration = self.configuration(&payload.repository.full_name).await?;
        if !configuration.requires_check(&payload.context) {
            return Err(ValidationError::invalid_format(
                "context",
                "context not configured for the repository",
            )
            .into());
        }

        let recorded = self
            .recorder
            .record(WebhookRecord {
                event: WebhookEvent::Status,
                repository: configuration.id.clone(),
                sha: payload.sha.clone(),
                discriminator: payload.context.clone(),
                state: payload.state.as_str().to_string(),
                sender: payload.sender.login.clone(),
                description: payload.description.clone(),
                pull_request_number: None,
            })
            .await?;
        let mut outcome = WebhookOutcome::recorded(self.ensure_new(recorded)?);

        if payload.state == StatusState::Success {
            let status = StatusEvent {
                repository: configuration.id.clone(),
                sha: payload.sha,
                context: payload.context,
                state: payload.state,
                description: payload.description,
                target_url: payload.target_url,
            };
            outcome.build = match self.run_gate(&configuration, &status).await {
                Ok(progress) => progress,
                Err(e) => return Err(self.forget(&outcome.webhook, e).await),
            };
        }

        Ok(outcome)
    }

    /// Records a pull request event, keeps the pull request row current and publishes
    /// the workflow verdict when the head changes.
    #[instrument(skip(self, payload), fields(repository = %payload.repository.full_name, action = %payload.action, number = payload.number))]
    pub async fn handle_pull_request(
        &self,
        payload: PullRequestEventPayload,
    ) -> Result<WebhookOutcome, ReleaseFlowError> {
        let details = &payload.pull_request;
        if details.base.ref_name.is_empty() {
            return Err(ValidationError::empty_field("pull_request.base.ref").into());
        }
        if details.head.ref_name.is_empty() {
            return Err(ValidationError::empty_field("pull_request.head.ref").into());
        }
        if !SUPPORTED_PULL_REQUEST_ACTIONS.contains(&payload.action.as_str()) {
            return Err(ValidationError::unsupported("action", payload.action.as_str()).into());
        }
        let configuration = self.configuration(&payload.repository.full_name).await?;

        // The row follows the latest event, duplicates included.
        let pull_request = self.save_pull_request(&configuration, &payload).await?;

        let recorded = self
            .recorder
            .record(WebhookRecord {
                event: WebhookEvent::PullRequest,
                repository: configuration.id.clone(),
                sha: details.head.sha.clone(),
                discriminator: details.id.to_string(),
                state: payload.action.clone(),
                sender: payload.sender.login.clone(),
                description: details.title.clone(),
                pull_request_number: Some(details.number),
            })
            .await?;
        let mut outcome = WebhookOutcome::recorded(self.ensure_new(recorded)?);

        if WORKFLOW_CHECKED_ACTIONS.contains(&payload.action.as_str()) {
            let definition = WorkflowDefinition::for_configuration(&configuration);
            let check = check_workflow(
                &definition,
                &configuration.id,
                pull_request.branch_pair(),
                Some(&self.settings.workflow_target_url),
            );

            if let Err(e) = self
                .client
                .create_status(
                    &configuration.owner,
                    &configuration.name,
                    &check.status.sha,
                    &check.status.to_commit_status(),
                )
                .await
            {
                return Err(self.forget(&outcome.webhook, e.into()).await);
            }
            info!(verdict = ?check.verdict, "Published workflow status");
            outcome.workflow = Some(check);
        }

        Ok(outcome)
    }

    /// Handles review submissions and dismissals.
    ///
    /// An approval is recorded and evaluates the quality gate. A change request revokes
    /// a recorded approval for the same commit. A dismissal removes the approval.
    #[instrument(skip(self, payload), fields(repository = %payload.repository.full_name, action = %payload.action, state = payload.review.state.as_str()))]
    pub async fn handle_review(
        &self,
        payload: PullRequestReviewEventPayload,
    ) -> Result<WebhookOutcome, ReleaseFlowError> {
        let sha = payload.pull_request.head.sha.clone();
        if sha.is_empty() {
            return Err(ValidationError::empty_field("pull_request.head.sha").into());
        }
        let configuration = self.configuration(&payload.repository.full_name).await?;

        match (payload.action.as_str(), payload.review.state) {
            ("submitted", ReviewState::Approved) => {
                let recorded = self
                    .recorder
                    .record(self.review_record(&configuration, &payload, APPROVED_REVIEW_STATE))
                    .await?;
                let mut outcome = WebhookOutcome::recorded(self.ensure_new(recorded)?);

                let status = StatusEvent {
                    repository: configuration.id.clone(),
                    sha,
                    context: REVIEW_CHECK.to_string(),
                    state: StatusState::Success,
                    description: None,
                    target_url: None,
                };
                outcome.build = match self.run_gate(&configuration, &status).await {
                    Ok(progress) => progress,
                    Err(e) => return Err(self.forget(&outcome.webhook, e).await),
                };
                Ok(outcome)
            }
            ("submitted", ReviewState::ChangesRequested) => {
                let revoked = match self
                    .recorder
                    .remove(&configuration.id, &sha, REVIEW_CHECK, APPROVED_REVIEW_STATE)
                    .await
                {
                    Ok(_) => true,
                    Err(ReleaseFlowError::NotFound { .. }) => false,
                    Err(e) => return Err(e),
                };
                if revoked {
                    info!(sha = %sha, "Revoked approval after change request");
                }

                let recorded = self
                    .recorder
                    .record(self.review_record(
                        &configuration,
                        &payload,
                        ReviewState::ChangesRequested.as_str(),
                    ))
                    .await?;
                if recorded.already_existed && !revoked {
                    return Err(self.duplicate(WebhookEvent::PullRequestReview, &recorded.webhook));
                }
                Ok(WebhookOutcome::recorded(recorded.webhook))
            }
            ("dismissed", _) => {
                let webhook = self
                    .recorder
                    .remove(&configuration.id, &sha, REVIEW_CHECK, APPROVED_REVIEW_STATE)
                    .await?;
                info!(sha = %sha, "Removed approval after dismissal");
                Ok(WebhookOutcome::recorded(webhook))
            }
            (action, state) => Err(ValidationError::unsupported(
                "action",
                format!("{} ({})", action, state.as_str()),
            )
            .into()),
        }
    }

    async fn configuration(&self, full_name: &str) -> Result<Configuration, ReleaseFlowError> {
        self.storage
            .get_configuration(full_name)
            .await
            .map_err(|e| ReleaseFlowError::from_lookup(e, "configuration", full_name))
    }

    fn review_record(
        &self,
        configuration: &Configuration,
        payload: &PullRequestReviewEventPayload,
        state: &str,
    ) -> WebhookRecord {
        WebhookRecord {
            event: WebhookEvent::PullRequestReview,
            repository: configuration.id.clone(),
            sha: payload.pull_request.head.sha.clone(),
            discriminator: REVIEW_CHECK.to_string(),
            state: state.to_string(),
            sender: payload.sender.login.clone(),
            description: payload.review.body.clone(),
            pull_request_number: Some(payload.pull_request.number),
        }
    }

    fn ensure_new(&self, recorded: RecordOutcome) -> Result<Webhook, ReleaseFlowError> {
        if recorded.already_existed {
            return Err(self.duplicate(recorded.webhook.event, &recorded.webhook));
        }
        Ok(recorded.webhook)
    }

    fn duplicate(&self, event: WebhookEvent, webhook: &Webhook) -> ReleaseFlowError {
        debug!(webhook_id = %webhook.id, "Duplicate delivery");
        self.metrics.record_duplicate_webhook(event.as_str());
        ReleaseFlowError::conflict("webhook", webhook.id.as_str())
    }

    /// Deletes a webhook recorded earlier in the same call so that a redelivery of the
    /// event is processed again, then hands back `error`.
    async fn forget(&self, webhook: &Webhook, error: ReleaseFlowError) -> ReleaseFlowError {
        match self.storage.delete_webhook(&webhook.id).await {
            Ok(()) => {
                info!(webhook_id = %webhook.id, error = %error, "Processing failed, webhook released for redelivery");
            }
            Err(e) => {
                warn!(webhook_id = %webhook.id, error = %e, "Failed to release webhook after processing failure");
            }
        }
        error
    }

    async fn run_gate(
        &self,
        configuration: &Configuration,
        status: &StatusEvent,
    ) -> Result<BuildProgress, ReleaseFlowError> {
        match self.build_engine.process_build(configuration, status).await {
            Ok(outcome) => Ok(outcome.into()),
            Err(ReleaseFlowError::QualityGateIncomplete { missing, .. }) => {
                info!(missing = ?missing, "Waiting for quality controls");
                Ok(BuildProgress::Pending { missing })
            }
            Err(e) => Err(e),
        }
    }

    async fn save_pull_request(
        &self,
        configuration: &Configuration,
        payload: &PullRequestEventPayload,
    ) -> Result<PullRequest, ReleaseFlowError> {
        let details = &payload.pull_request;

        match self.storage.get_pull_request(details.id).await {
            Ok(mut existing) => {
                existing.refresh(details, &payload.action);
                self.storage.update_pull_request(&existing).await?;
                Ok(existing)
            }
            Err(e) if e.is_not_found() => {
                let created = PullRequest::from_details(details, &configuration.id, &payload.action);
                match self.storage.insert_pull_request(&created).await {
                    Ok(()) => Ok(created),
                    Err(StorageError::Duplicate { .. }) => {
                        self.storage.update_pull_request(&created).await?;
                        Ok(created)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn parse_payload<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ReleaseFlowError> {
    serde_json::from_slice(body)
        .map_err(|e| ValidationError::invalid_format("body", e.to_string()).into())
}
