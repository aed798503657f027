//! Validated changes of the active provider/model.

use std::sync::Arc;

use log::{debug, info, warn};
use secrecy::SecretString;

use crate::api::Backend;
use crate::error::{ClientError, ClientResult};
use crate::models::{ConfigUpdate, Credential, ProviderConfiguration, ProviderId};

use super::credentials::validate_credential;
use super::lifecycle::LocalModelManager;
use super::registry::RegistryClient;
use super::state::{ProviderSnapshot, SessionState};

/// Commits provider/model switches and credential changes.
///
/// Preconditions are checked against the last fetched snapshot without a
/// fresh read. A local switch holds the target model's busy flag in the
/// [`LocalModelManager`], so it fails with [`ClientError::Busy`] while that
/// model is being loaded or unloaded, and blocks such operations until the
/// switch is confirmed. After the backend accepts a change the configuration
/// is re-fetched; the cache is never advanced from the request alone.
#[derive(Clone)]
pub struct SwitchController {
    backend: Arc<dyn Backend>,
    registry: RegistryClient,
    state: SessionState,
    models: LocalModelManager,
}

impl SwitchController {
    pub fn new(
        backend: Arc<dyn Backend>,
        registry: RegistryClient,
        state: SessionState,
        models: LocalModelManager,
    ) -> Self {
        Self {
            backend,
            registry,
            state,
            models,
        }
    }

    /// Fetches configuration and local inventory into the session cache.
    pub async fn refresh_snapshot(&self) -> ClientResult<ProviderSnapshot> {
        let configuration = self.registry.get_configuration().await?;
        self.state.store_configuration(configuration).await;
        let models = self.registry.get_local_models().await?;
        self.state.store_local_models(models).await;
        Ok(self.state.snapshot().await)
    }

    /// Active provider/model as last confirmed by the backend.
    pub async fn active(&self) -> Option<(ProviderId, String)> {
        self.state
            .configuration()
            .await
            .map(|config| (config.active_provider, config.active_model))
    }

    pub async fn switch_active_model(
        &self,
        provider: ProviderId,
        model_name: &str,
    ) -> ClientResult<ProviderConfiguration> {
        let model_name = model_name.trim();
        if model_name.is_empty() {
            return Err(ClientError::validation("Model name must not be empty"));
        }

        let _guard = match provider {
            ProviderId::Local => Some(self.models.reserve(model_name)?),
            _ => None,
        };
        let snapshot = self.state.snapshot().await;
        check_switch_preconditions(&snapshot, provider, model_name)?;

        info!("Switching active model to {}/{}", provider, model_name);
        let accepted = self
            .backend
            .update_provider_config(&ConfigUpdate::switch(provider, model_name))
            .await?;
        debug!(
            "Backend accepted switch (reported {}/{})",
            accepted.active_provider, accepted.active_model
        );

        let confirmed = self.refetch_configuration().await?;
        if !confirmed.is_active(provider, model_name) {
            return Err(ClientError::Unconfirmed(format!(
                "requested {}/{}, backend reports {}/{}",
                provider, model_name, confirmed.active_provider, confirmed.active_model
            )));
        }
        if !confirmed.is_consistent() {
            return Err(ClientError::Unconfirmed(format!(
                "model '{}' is not registered for provider {}",
                model_name, provider
            )));
        }

        info!("Active model is now {}/{}", provider, model_name);
        Ok(confirmed)
    }

    /// Stores a credential for a remote provider after a local format check.
    pub async fn set_remote_credential(
        &self,
        provider: ProviderId,
        secret: &SecretString,
    ) -> ClientResult<ProviderConfiguration> {
        let credential = Credential::from_secret(secret);
        validate_credential(provider, &credential)?;

        info!(
            "Updating credential for provider {} ({:?})",
            provider, credential
        );
        self.backend
            .update_provider_config(&ConfigUpdate::credential(provider, credential.clone()))
            .await?;

        // Confirmed only if the stored key would satisfy the switch precondition.
        let confirmed = self.refetch_configuration().await?;
        match confirmed
            .settings(provider)
            .and_then(|settings| settings.api_key.as_ref())
        {
            Some(stored) if validate_credential(provider, stored).is_ok() => Ok(confirmed),
            Some(stored) => Err(ClientError::Unconfirmed(format!(
                "credential for provider {} is reported as {:?}, which fails the format check",
                provider, stored
            ))),
            None => Err(ClientError::Unconfirmed(format!(
                "credential for provider {} was not stored",
                provider
            ))),
        }
    }

    async fn refetch_configuration(&self) -> ClientResult<ProviderConfiguration> {
        let configuration = self.registry.get_configuration().await.map_err(|e| {
            warn!("Configuration re-fetch after mutation failed: {}", e);
            e
        })?;
        self.state.store_configuration(configuration.clone()).await;
        Ok(configuration)
    }
}

/// Validates a switch against the cached snapshot. Never touches the network.
pub fn check_switch_preconditions(
    snapshot: &ProviderSnapshot,
    provider: ProviderId,
    model_name: &str,
) -> ClientResult<()> {
    match provider {
        ProviderId::Local => {
            if snapshot.is_loaded(model_name) {
                Ok(())
            } else {
                Err(ClientError::validation(format!(
                    "Local model '{}' is not loaded (loaded: [{}])",
                    model_name,
                    snapshot.loaded_models().join(", ")
                )))
            }
        }
        remote => {
            let credential = snapshot
                .configuration
                .as_ref()
                .and_then(|config| config.settings(remote))
                .and_then(|settings| settings.api_key.as_ref())
                .ok_or_else(|| {
                    ClientError::validation(format!(
                        "No credential configured for provider {}",
                        remote
                    ))
                })?;
            validate_credential(remote, credential)
        }
    }
}
