//! Read-only access to provider configuration, status and inventories.

use std::sync::Arc;

use log::{debug, warn};

use crate::api::Backend;
use crate::error::ClientResult;
use crate::models::{
    LocalModel, ProviderConfiguration, ProviderId, ProviderStatus, RemoteModel, RemoteStatus,
};

/// Side-effect-free reads against the backend.
///
/// Nothing is cached here and failures are returned as-is; callers that
/// need a session view go through [`crate::providers::SessionState`].
#[derive(Clone)]
pub struct RegistryClient {
    backend: Arc<dyn Backend>,
}

impl RegistryClient {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    pub async fn get_configuration(&self) -> ClientResult<ProviderConfiguration> {
        let config = self.backend.provider_config().await?;
        debug!(
            "Provider configuration: active {}/{}",
            config.active_provider, config.active_model
        );
        if !config.is_consistent() {
            warn!(
                "Backend reports active model '{}' that is not registered for provider {}",
                config.active_model, config.active_provider
            );
        }
        Ok(config)
    }

    pub async fn get_all_provider_statuses(&self) -> ClientResult<Vec<ProviderStatus>> {
        self.backend.provider_statuses().await
    }

    /// Status of a single provider, if the backend reports it.
    pub async fn get_provider_status(
        &self,
        provider: ProviderId,
    ) -> ClientResult<Option<ProviderStatus>> {
        let statuses = self.backend.provider_statuses().await?;
        Ok(statuses.into_iter().find(|s| s.provider == provider))
    }

    pub async fn get_local_models(&self) -> ClientResult<Vec<LocalModel>> {
        let models = self.backend.local_models().await?;
        debug!(
            "Local inventory: {} models, {} loaded",
            models.len(),
            models.iter().filter(|m| m.loaded).count()
        );
        Ok(models)
    }

    pub async fn get_remote_provider_status(&self) -> ClientResult<RemoteStatus> {
        self.backend.remote_status().await
    }

    pub async fn get_remote_models(&self) -> ClientResult<Vec<RemoteModel>> {
        self.backend.remote_models().await
    }
}
