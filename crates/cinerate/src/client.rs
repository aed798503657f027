//! Wiring of every component around one backend and one session state.

use std::sync::Arc;

use log::info;

use crate::analysis::{AnalysisOrchestrator, SceneValidationPass};
use crate::api::{Backend, HttpBackend};
use crate::broadcast::AnalysisProgressBroadcaster;
use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::health::{HealthAggregator, HealthMonitor};
use crate::intake::DocumentIntake;
use crate::providers::{LocalModelManager, RegistryClient, SessionState, SwitchController};
use crate::sanitize::redact_url;

/// All client components sharing one backend and one session cache.
#[derive(Clone)]
pub struct CinerateClient {
    pub intake: DocumentIntake,
    pub analysis: AnalysisOrchestrator,
    pub validation: SceneValidationPass,
    pub registry: RegistryClient,
    pub models: LocalModelManager,
    pub switch: SwitchController,
    pub health: HealthAggregator,
    state: SessionState,
    config: ClientConfig,
}

impl CinerateClient {
    /// Builds a client talking HTTP to the configured backend.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let backend = HttpBackend::from_config(&config.backend)?;
        info!(
            "Using analysis backend at {}",
            redact_url(backend.base_url().as_str())
        );
        Ok(Self::with_backend(Arc::new(backend), config))
    }

    /// Builds a client around any [`Backend`] implementation.
    pub fn with_backend(backend: Arc<dyn Backend>, config: &ClientConfig) -> Self {
        let state = SessionState::new();
        let registry = RegistryClient::new(Arc::clone(&backend));
        let models = LocalModelManager::new(Arc::clone(&backend), registry.clone(), state.clone());

        Self {
            intake: DocumentIntake::new(Arc::clone(&backend), config.upload.clone()),
            analysis: AnalysisOrchestrator::with_broadcaster(
                Arc::clone(&backend),
                config.analysis.poll_interval(),
                AnalysisProgressBroadcaster::default(),
            ),
            validation: SceneValidationPass::new(Arc::clone(&backend)),
            switch: SwitchController::new(
                Arc::clone(&backend),
                registry.clone(),
                state.clone(),
                models.clone(),
            ),
            models,
            health: HealthAggregator::new(
                backend,
                state.clone(),
                config.health.error_log_capacity,
            ),
            registry,
            state,
            config: config.clone(),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Starts the health monitor if enabled in the configuration.
    pub fn start_health_monitor(&self) -> Option<HealthMonitor> {
        if !self.config.health.enabled {
            return None;
        }
        Some(HealthMonitor::start(
            self.health.clone(),
            self.config.health.interval,
        ))
    }
}
