//! LLM provider configuration, status and model inventory.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Interchangeable LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// Co-located models that must be loaded before use.
    Local,
    /// Metered remote API that requires a credential.
    OpenRouter,
}

impl ProviderId {
    pub fn is_local(&self) -> bool {
        matches!(self, ProviderId::Local)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Local => "local",
            ProviderId::OpenRouter => "openrouter",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An API credential. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn from_secret(secret: &SecretString) -> Self {
        Self(secret.expose_secret().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Credential({})", crate::sanitize::mask_credential(&self.0))
    }
}

/// Per-provider connection settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<Credential>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Retry hint forwarded to the backend as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
}

impl ProviderSettings {
    pub fn has_credential(&self) -> bool {
        self.api_key.as_ref().is_some_and(|key| !key.is_empty())
    }
}

/// Generation parameters for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub provider: ProviderId,
    #[serde(default)]
    pub context_window: Option<u32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

/// Active provider/model selection plus all provider and model settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfiguration {
    pub active_provider: ProviderId,
    pub active_model: String,
    #[serde(default)]
    pub providers: BTreeMap<ProviderId, ProviderSettings>,
    #[serde(default)]
    pub models: BTreeMap<String, ModelConfig>,
}

impl ProviderConfiguration {
    /// The active model exists in the model map and belongs to the active provider.
    pub fn is_consistent(&self) -> bool {
        self.models
            .get(&self.active_model)
            .is_some_and(|model| model.provider == self.active_provider)
    }

    pub fn is_active(&self, provider: ProviderId, model: &str) -> bool {
        self.active_provider == provider && self.active_model == model
    }

    pub fn settings(&self, provider: ProviderId) -> Option<&ProviderSettings> {
        self.providers.get(&provider)
    }
}

/// Partial configuration update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_provider: Option<ProviderId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_model: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub providers: BTreeMap<ProviderId, ProviderSettings>,
}

impl ConfigUpdate {
    pub fn switch(provider: ProviderId, model: &str) -> Self {
        Self {
            active_provider: Some(provider),
            active_model: Some(model.to_string()),
            ..Default::default()
        }
    }

    pub fn credential(provider: ProviderId, credential: Credential) -> Self {
        let mut providers = BTreeMap::new();
        providers.insert(
            provider,
            ProviderSettings {
                api_key: Some(credential),
                ..Default::default()
            },
        );
        Self {
            providers,
            ..Default::default()
        }
    }
}

/// Health of one provider as last reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub provider: ProviderId,
    pub available: bool,
    pub healthy: bool,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub last_checked: DateTime<Utc>,
}

/// A model in the local inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalModel {
    pub name: String,
    #[serde(default)]
    pub size_bytes: u64,
    pub loaded: bool,
    #[serde(default)]
    pub context_window: u32,
    #[serde(default)]
    pub max_tokens: u32,
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
    /// Set while a load/unload for this model is in flight. Never sent or received.
    #[serde(skip)]
    pub busy: bool,
}

/// Backend acknowledgement of a load/unload request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOperation {
    pub model_name: String,
    pub loaded: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Connectivity and quota of the remote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteStatus {
    pub connected: bool,
    #[serde(default)]
    pub credits_remaining: Option<f64>,
    #[serde(default)]
    pub credits_used: Option<f64>,
    #[serde(default)]
    pub rate_limit_per_minute: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

/// A model offered by the remote provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteModel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub context_length: Option<u32>,
    #[serde(default)]
    pub prompt_price_per_1k: Option<f64>,
    #[serde(default)]
    pub completion_price_per_1k: Option<f64>,
}
