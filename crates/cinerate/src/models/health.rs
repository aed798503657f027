//! Health check results and the backend error log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::provider::ProviderId;

/// Backend subsystems with their own health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthService {
    VectorStore,
    EmbeddingService,
    Environment,
}

impl HealthService {
    pub const ALL: [HealthService; 3] = [
        HealthService::VectorStore,
        HealthService::EmbeddingService,
        HealthService::Environment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HealthService::VectorStore => "vector_store",
            HealthService::EmbeddingService => "embedding_service",
            HealthService::Environment => "environment",
        }
    }
}

impl std::fmt::Display for HealthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reported by a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    #[serde(alias = "healthy")]
    Ok,
    /// Available but not optimal (partial configuration, slow, degraded).
    #[serde(alias = "degraded")]
    Partial,
    Unavailable,
}

/// Response of a service health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCheck {
    pub service: HealthService,
    pub status: CheckStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub latency_ms: Option<f64>,
}

/// What a check in a health report looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "snake_case")]
pub enum CheckTarget {
    Service(HealthService),
    Provider(ProviderId),
}

impl std::fmt::Display for CheckTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckTarget::Service(service) => write!(f, "{}", service),
            CheckTarget::Provider(provider) => write!(f, "provider:{}", provider),
        }
    }
}

/// One line of a health report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub target: CheckTarget,
    pub status: CheckStatus,
    pub required: bool,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Composite health across all subsystems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallHealth {
    Healthy,
    Degraded,
    Unhealthy,
}

impl OverallHealth {
    /// Folds check outcomes into an overall verdict.
    pub fn from_checks(checks: &[CheckOutcome]) -> Self {
        let required_down = checks
            .iter()
            .any(|c| c.required && c.status == CheckStatus::Unavailable);
        if required_down {
            return OverallHealth::Unhealthy;
        }
        let any_suboptimal = checks.iter().any(|c| c.status != CheckStatus::Ok);
        if any_suboptimal {
            OverallHealth::Degraded
        } else {
            OverallHealth::Healthy
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub overall: OverallHealth,
    pub checks: Vec<CheckOutcome>,
    pub checked_at: DateTime<Utc>,
}

impl HealthReport {
    pub fn new(checks: Vec<CheckOutcome>) -> Self {
        Self {
            overall: OverallHealth::from_checks(&checks),
            checks,
            checked_at: Utc::now(),
        }
    }

    pub fn check(&self, target: CheckTarget) -> Option<&CheckOutcome> {
        self.checks.iter().find(|c| c.target == target)
    }
}

/// An entry of the backend error log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub subsystem: String,
    pub message: String,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub resolved: bool,
}
