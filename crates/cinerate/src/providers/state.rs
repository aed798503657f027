//! Session-scoped cache of backend-reported provider truth.
//!
//! The cache is owned by one [`SessionState`] handle shared between
//! components. Readers take snapshots; writes are crate-private and happen
//! only after a backend response, never ahead of one.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::models::{LocalModel, ProviderConfiguration, ProviderId, ProviderStatus, RemoteStatus};

/// Point-in-time view of the cached provider state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderSnapshot {
    pub configuration: Option<ProviderConfiguration>,
    pub local_models: Vec<LocalModel>,
    pub statuses: BTreeMap<ProviderId, ProviderStatus>,
    pub remote_status: Option<RemoteStatus>,
    pub configuration_fetched_at: Option<DateTime<Utc>>,
    pub local_models_fetched_at: Option<DateTime<Utc>>,
}

impl ProviderSnapshot {
    /// Whether `name` is in the last fetched set of loaded local models.
    pub fn is_loaded(&self, name: &str) -> bool {
        self.local_models
            .iter()
            .any(|model| model.loaded && model.name == name)
    }

    pub fn loaded_models(&self) -> Vec<&str> {
        self.local_models
            .iter()
            .filter(|model| model.loaded)
            .map(|model| model.name.as_str())
            .collect()
    }

    pub fn active(&self) -> Option<(ProviderId, &str)> {
        self.configuration
            .as_ref()
            .map(|config| (config.active_provider, config.active_model.as_str()))
    }
}

/// Shared handle to the session cache.
#[derive(Clone, Default)]
pub struct SessionState {
    inner: Arc<RwLock<ProviderSnapshot>>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> ProviderSnapshot {
        self.inner.read().await.clone()
    }

    pub async fn configuration(&self) -> Option<ProviderConfiguration> {
        self.inner.read().await.configuration.clone()
    }

    pub async fn local_models(&self) -> Vec<LocalModel> {
        self.inner.read().await.local_models.clone()
    }

    pub async fn provider_status(&self, provider: ProviderId) -> Option<ProviderStatus> {
        self.inner.read().await.statuses.get(&provider).cloned()
    }

    pub(crate) async fn store_configuration(&self, configuration: ProviderConfiguration) {
        let mut state = self.inner.write().await;
        state.configuration = Some(configuration);
        state.configuration_fetched_at = Some(Utc::now());
    }

    pub(crate) async fn store_local_models(&self, models: Vec<LocalModel>) {
        let mut state = self.inner.write().await;
        state.local_models = models;
        state.local_models_fetched_at = Some(Utc::now());
    }

    pub(crate) async fn store_statuses(&self, statuses: Vec<ProviderStatus>) {
        let mut state = self.inner.write().await;
        for status in statuses {
            state.statuses.insert(status.provider, status);
        }
    }

    pub(crate) async fn store_remote_status(&self, status: RemoteStatus) {
        self.inner.write().await.remote_status = Some(status);
    }
}
