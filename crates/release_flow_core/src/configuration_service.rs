//! Repository enrollment.
//!
//! Creating a configuration applies the workflow's branch protection before the
//! configuration is stored, so an enrolled repository is always protected. Deleting it
//! removes the protection again.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};

use crate::configuration::{Configuration, ConfigurationRequest, ConfigurationUpdate};
use crate::errors::{ReleaseFlowError, StorageError};
use crate::protection::BranchProtectionOrchestrator;
use crate::storage::Storage;

#[cfg(test)]
#[path = "configuration_service_tests.rs"]
mod tests;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateOutcome {
    pub configuration: Configuration,
    /// `false` when the repository was already enrolled.
    pub created: bool,
}

pub struct ConfigurationService {
    storage: Arc<dyn Storage>,
    protection: BranchProtectionOrchestrator,
}

impl ConfigurationService {
    pub fn new(storage: Arc<dyn Storage>, protection: BranchProtectionOrchestrator) -> Self {
        Self {
            storage,
            protection,
        }
    }

    /// Enrolls a repository.
    ///
    /// An already enrolled repository is returned unchanged without touching GitHub.
    ///
    /// # Errors
    ///
    /// Validation errors for the request, branch protection errors, or storage errors.
    #[instrument(skip(self, request), fields(owner = %request.owner, name = %request.name))]
    pub async fn create(
        &self,
        request: ConfigurationRequest,
    ) -> Result<CreateOutcome, ReleaseFlowError> {
        let configuration = Configuration::from_request(request)?;

        match self.storage.get_configuration(&configuration.id).await {
            Ok(existing) => {
                info!("Repository already enrolled");
                return Ok(CreateOutcome {
                    configuration: existing,
                    created: false,
                });
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e.into()),
        }

        self.protection.set_workflow(&configuration).await?;

        match self.storage.insert_configuration(&configuration).await {
            Ok(()) => {
                info!(id = %configuration.id, "Enrolled repository");
                Ok(CreateOutcome {
                    configuration,
                    created: true,
                })
            }
            Err(StorageError::Duplicate { .. }) => {
                let existing = self.get(&configuration.id).await?;
                Ok(CreateOutcome {
                    configuration: existing,
                    created: false,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn get(&self, id: &str) -> Result<Configuration, ReleaseFlowError> {
        self.storage
            .get_configuration(id)
            .await
            .map_err(|e| ReleaseFlowError::from_lookup(e, "configuration", id))
    }

    /// Applies a partial update and re-applies the workflow protection.
    ///
    /// Replacing the required checks drops the old check rows first.
    #[instrument(skip(self, update))]
    pub async fn update(
        &self,
        id: &str,
        update: ConfigurationUpdate,
    ) -> Result<Configuration, ReleaseFlowError> {
        let mut configuration = self.get(id).await?;
        let checks_replaced = configuration.apply(update)?;

        if checks_replaced {
            self.storage.delete_required_status_checks(id).await?;
        }
        self.storage.update_configuration(&configuration).await?;
        self.protection.set_workflow(&configuration).await?;

        info!(checks_replaced, "Updated configuration");
        Ok(configuration)
    }

    /// Removes the workflow protection and deletes the configuration.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<Configuration, ReleaseFlowError> {
        let configuration = self.get(id).await?;

        self.protection.unset_workflow(&configuration).await?;
        self.storage
            .delete_configuration(id)
            .await
            .map_err(|e| ReleaseFlowError::from_lookup(e, "configuration", id))?;

        info!("Removed configuration");
        Ok(configuration)
    }
}
