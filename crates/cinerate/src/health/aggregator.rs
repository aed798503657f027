//! Composite health check across independent subsystems.

use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use log::{debug, warn};
use tokio::sync::RwLock;

use crate::api::Backend;
use crate::error::ClientResult;
use crate::models::{
    CheckOutcome, CheckStatus, CheckTarget, HealthReport, HealthService, ProviderId,
    ProviderStatus,
};
use crate::providers::SessionState;

use super::error_log::ErrorHistory;

const PROVIDERS: [ProviderId; 2] = [ProviderId::Local, ProviderId::OpenRouter];

/// Runs health checks and keeps the error history.
///
/// Every check runs independently; a failing or slow check turns into an
/// `Unavailable` outcome for its own target and never hides the others.
#[derive(Clone)]
pub struct HealthAggregator {
    backend: Arc<dyn Backend>,
    state: SessionState,
    error_history: Arc<RwLock<ErrorHistory>>,
}

impl HealthAggregator {
    pub fn new(backend: Arc<dyn Backend>, state: SessionState, error_log_capacity: usize) -> Self {
        Self {
            backend,
            state,
            error_history: Arc::new(RwLock::new(ErrorHistory::new(error_log_capacity))),
        }
    }

    pub async fn check_once(&self) -> HealthReport {
        let service_checks = join_all(HealthService::ALL.map(|service| self.check_service(service)));
        let (mut checks, provider_checks) =
            tokio::join!(service_checks, self.check_providers());
        checks.extend(provider_checks);

        let report = HealthReport::new(checks);
        debug!(
            "Health check: {:?} ({} checks)",
            report.overall,
            report.checks.len()
        );
        report
    }

    async fn check_service(&self, service: HealthService) -> CheckOutcome {
        let started = Instant::now();
        let result = self.backend.service_health(service).await;
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(check) => CheckOutcome {
                target: CheckTarget::Service(service),
                status: check.status,
                required: true,
                latency_ms: check.latency_ms.or(Some(elapsed_ms)),
                message: check.message,
            },
            Err(e) => {
                warn!("Health check of {} failed: {}", service, e);
                CheckOutcome {
                    target: CheckTarget::Service(service),
                    status: CheckStatus::Unavailable,
                    required: true,
                    latency_ms: None,
                    message: Some(e.to_string()),
                }
            }
        }
    }

    async fn check_providers(&self) -> Vec<CheckOutcome> {
        let active = self
            .state
            .configuration()
            .await
            .map(|config| config.active_provider);

        match self.backend.provider_statuses().await {
            Ok(statuses) => {
                let outcomes = PROVIDERS
                    .iter()
                    .map(|provider| {
                        let required = active == Some(*provider);
                        match statuses.iter().find(|s| s.provider == *provider) {
                            Some(status) => provider_outcome(status, required),
                            None => CheckOutcome {
                                target: CheckTarget::Provider(*provider),
                                status: CheckStatus::Unavailable,
                                required,
                                latency_ms: None,
                                message: Some("not reported by backend".to_string()),
                            },
                        }
                    })
                    .collect();
                self.state.store_statuses(statuses).await;
                outcomes
            }
            Err(e) => {
                warn!("Provider status check failed: {}", e);
                PROVIDERS
                    .iter()
                    .map(|provider| CheckOutcome {
                        target: CheckTarget::Provider(*provider),
                        status: CheckStatus::Unavailable,
                        required: active == Some(*provider),
                        latency_ms: None,
                        message: Some(e.to_string()),
                    })
                    .collect()
            }
        }
    }

    /// Fetches the backend error log and merges it into the history.
    pub async fn refresh_error_log(&self) -> ClientResult<ErrorHistory> {
        let entries = self.backend.error_log().await?;
        let mut history = self.error_history.write().await;
        let added = history.merge(entries);
        debug!(
            "Error log refreshed: {} new, {} unresolved",
            added,
            history.unresolved().count()
        );
        Ok(history.clone())
    }

    /// The merged error history as of the last refresh.
    pub async fn error_history(&self) -> ErrorHistory {
        self.error_history.read().await.clone()
    }
}

fn provider_outcome(status: &ProviderStatus, required: bool) -> CheckOutcome {
    let check_status = if !status.available {
        CheckStatus::Unavailable
    } else if !status.healthy {
        CheckStatus::Partial
    } else {
        CheckStatus::Ok
    };
    CheckOutcome {
        target: CheckTarget::Provider(status.provider),
        status: check_status,
        required,
        latency_ms: status.latency_ms,
        message: status.error_message.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn status(available: bool, healthy: bool) -> ProviderStatus {
        ProviderStatus {
            provider: ProviderId::OpenRouter,
            available,
            healthy,
            latency_ms: Some(120.0),
            error_message: None,
            last_checked: Utc::now(),
        }
    }

    #[test]
    fn test_provider_outcome_mapping() {
        assert_eq!(provider_outcome(&status(true, true), true).status, CheckStatus::Ok);
        assert_eq!(
            provider_outcome(&status(true, false), true).status,
            CheckStatus::Partial
        );
        let outcome = provider_outcome(&status(false, false), false);
        assert_eq!(outcome.status, CheckStatus::Unavailable);
        assert!(!outcome.required);
        assert_eq!(outcome.target, CheckTarget::Provider(ProviderId::OpenRouter));
    }
}
