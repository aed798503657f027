//! Load/unload of local models with per-model exclusivity.

use std::sync::Arc;

use log::{info, warn};

use crate::api::Backend;
use crate::busy::{BusyGuard, InFlight};
use crate::error::{ClientError, ClientResult};
use crate::models::{LocalModel, ModelOperation};

use super::registry::RegistryClient;
use super::state::SessionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelAction {
    Load,
    Unload,
}

impl ModelAction {
    fn expected_loaded(&self) -> bool {
        matches!(self, ModelAction::Load)
    }
}

impl std::fmt::Display for ModelAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelAction::Load => write!(f, "load"),
            ModelAction::Unload => write!(f, "unload"),
        }
    }
}

/// Loads and unloads local models.
///
/// A second load/unload of a model while one is in flight fails with
/// [`ClientError::Busy`] instead of queueing.
#[derive(Clone)]
pub struct LocalModelManager {
    backend: Arc<dyn Backend>,
    registry: RegistryClient,
    state: SessionState,
    in_flight: InFlight,
}

impl LocalModelManager {
    pub fn new(backend: Arc<dyn Backend>, registry: RegistryClient, state: SessionState) -> Self {
        Self {
            backend,
            registry,
            state,
            in_flight: InFlight::default(),
        }
    }

    pub async fn load(&self, name: &str) -> ClientResult<ModelOperation> {
        self.run(ModelAction::Load, name).await
    }

    pub async fn unload(&self, name: &str) -> ClientResult<ModelOperation> {
        self.run(ModelAction::Unload, name).await
    }

    pub fn is_busy(&self, name: &str) -> bool {
        self.in_flight.contains(name)
    }

    /// Marks `name` busy without a backend call, so no load/unload of it can
    /// start while the guard lives.
    pub(crate) fn reserve(&self, name: &str) -> ClientResult<BusyGuard> {
        self.in_flight.acquire(name)
    }

    /// Cached inventory with busy flags applied.
    pub async fn models(&self) -> Vec<LocalModel> {
        let mut models = self.state.local_models().await;
        for model in &mut models {
            model.busy = self.in_flight.contains(&model.name);
        }
        models
    }

    /// Re-fetches the inventory into the session cache.
    pub async fn refresh(&self) -> ClientResult<Vec<LocalModel>> {
        let models = self.registry.get_local_models().await?;
        self.state.store_local_models(models.clone()).await;
        Ok(models)
    }

    async fn run(&self, action: ModelAction, name: &str) -> ClientResult<ModelOperation> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ClientError::validation("Model name must not be empty"));
        }

        let _guard = self.reserve(name)?;
        info!("Requesting {} of local model '{}'", action, name);

        let result = match action {
            ModelAction::Load => self.backend.load_model(name).await,
            ModelAction::Unload => self.backend.unload_model(name).await,
        };
        let operation = result.map_err(|e| {
            warn!("Failed to {} model '{}': {}", action, name, e);
            e
        })?;

        // The cache follows the backend, not the acknowledgement.
        let models = self.refresh().await?;
        let now_loaded = models.iter().any(|m| m.name == name && m.loaded);
        if now_loaded != action.expected_loaded() {
            return Err(ClientError::Unconfirmed(format!(
                "{} of '{}' acknowledged but inventory reports loaded={}",
                action, name, now_loaded
            )));
        }

        info!("Local model '{}' {}ed", name, action);
        Ok(operation)
    }
}
