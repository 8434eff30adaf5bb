//! Webhook ingestion and deduplication.
//!
//! Every inbound event is reduced to a deterministic id computed from the repository,
//! the commit sha, an event specific discriminator and the state. Redeliveries of the
//! same event produce the same id, so recording is at-most-once. The quality gate
//! recomputes the same ids to find out which checks have been reported for a commit.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use github_client::WebhookEvent;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, instrument};

use crate::errors::{ReleaseFlowError, StorageError};
use crate::storage::Storage;

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;

/// Number of hex characters kept from the digest.
const DEDUP_ID_LENGTH: usize = 32;

/// Computes the dedup id of an event.
///
/// The discriminator is the status context for status events, the review check name for
/// reviews and the pull request id for pull request events.
pub fn dedup_id(repository: &str, sha: &str, discriminator: &str, state: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(repository.as_bytes());
    hasher.update(sha.as_bytes());
    hasher.update(discriminator.as_bytes());
    hasher.update(state.as_bytes());

    let mut id = hex::encode(hasher.finalize());
    id.truncate(DEDUP_ID_LENGTH);
    id
}

/// A recorded inbound event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub event: WebhookEvent,
    /// Repository full name.
    pub repository: String,
    pub sender: String,
    pub sha: String,
    /// The discriminator the id was computed from.
    pub context: String,
    pub state: String,
    pub description: Option<String>,
    pub pull_request_number: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The identifying fields and payload data of an event to record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookRecord {
    pub event: WebhookEvent,
    pub repository: String,
    pub sha: String,
    pub discriminator: String,
    pub state: String,
    pub sender: String,
    pub description: Option<String>,
    pub pull_request_number: Option<u64>,
}

impl WebhookRecord {
    pub fn dedup_id(&self) -> String {
        dedup_id(&self.repository, &self.sha, &self.discriminator, &self.state)
    }

    fn into_webhook(self, id: String) -> Webhook {
        let now = Utc::now();
        Webhook {
            id,
            event: self.event,
            repository: self.repository,
            sender: self.sender,
            sha: self.sha,
            context: self.discriminator,
            state: self.state,
            description: self.description,
            pull_request_number: self.pull_request_number,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordOutcome {
    pub webhook: Webhook,
    /// `true` when the event had been recorded before.
    pub already_existed: bool,
}

/// Records events at most once.
#[derive(Clone)]
pub struct WebhookRecorder {
    storage: Arc<dyn Storage>,
}

impl WebhookRecorder {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Records an event unless its dedup id is already stored.
    ///
    /// A duplicate key reported by the insert is treated as an existing record, which
    /// covers two deliveries racing between the lookup and the insert.
    #[instrument(skip(self, record), fields(repository = %record.repository, sha = %record.sha, event = %record.event))]
    pub async fn record(&self, record: WebhookRecord) -> Result<RecordOutcome, ReleaseFlowError> {
        let id = record.dedup_id();

        match self.storage.get_webhook(&id).await {
            Ok(existing) => {
                debug!(webhook_id = %id, "Webhook already recorded");
                return Ok(RecordOutcome {
                    webhook: existing,
                    already_existed: true,
                });
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        let webhook = record.into_webhook(id);
        match self.storage.insert_webhook(&webhook).await {
            Ok(()) => {
                info!(webhook_id = %webhook.id, state = %webhook.state, "Recorded webhook");
                Ok(RecordOutcome {
                    webhook,
                    already_existed: false,
                })
            }
            Err(StorageError::Duplicate { .. }) => {
                debug!(webhook_id = %webhook.id, "Webhook recorded concurrently");
                Ok(RecordOutcome {
                    webhook,
                    already_existed: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Returns whether an event with the given identifying fields has been recorded.
    pub async fn is_recorded(
        &self,
        repository: &str,
        sha: &str,
        discriminator: &str,
        state: &str,
    ) -> Result<bool, StorageError> {
        let id = dedup_id(repository, sha, discriminator, state);
        match self.storage.get_webhook(&id).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Deletes a recorded event and returns it.
    ///
    /// # Errors
    ///
    /// Returns `ReleaseFlowError::NotFound` when no such event was recorded.
    #[instrument(skip(self))]
    pub async fn remove(
        &self,
        repository: &str,
        sha: &str,
        discriminator: &str,
        state: &str,
    ) -> Result<Webhook, ReleaseFlowError> {
        let id = dedup_id(repository, sha, discriminator, state);

        let webhook = self
            .storage
            .get_webhook(&id)
            .await
            .map_err(|e| ReleaseFlowError::from_lookup(e, "webhook", id.as_str()))?;
        self.storage
            .delete_webhook(&id)
            .await
            .map_err(|e| ReleaseFlowError::from_lookup(e, "webhook", id.as_str()))?;

        info!(webhook_id = %id, "Removed webhook");
        Ok(webhook)
    }
}
