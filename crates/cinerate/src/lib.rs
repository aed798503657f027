pub mod analysis;
pub mod api;
pub mod broadcast;
mod busy;
pub mod client;
pub mod config;
pub mod error;
pub mod health;
pub mod intake;
pub mod logging;
pub mod models;
pub mod providers;
pub mod sanitize;
pub mod secrets;

pub use analysis::{AnalysisJob, AnalysisOrchestrator, PollHandle, PollOutcome};
pub use api::{Backend, HttpBackend};
pub use broadcast::{AnalysisEvent, AnalysisProgressBroadcaster};
pub use client::CinerateClient;
pub use config::{load_config, ClientConfig};
pub use error::{CinerateError, ClientError, ClientResult, ConfigError, RejectionKind, Result};
pub use health::{ErrorHistory, HealthAggregator, HealthMonitor};
pub use intake::DocumentIntake;
pub use providers::{LocalModelManager, RegistryClient, SessionState, SwitchController};
pub use secrets::{
    resolve_remote_credential, resolve_secret, resolve_secret_optional, SecretError,
};
