//! Scripted in-memory backend.
//!
//! Every call is recorded by name so tests can assert how many requests a
//! component issued. Load and status calls can be held on a gate to observe
//! in-flight behaviour.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use cinerate::api::{
    AnalyzeResponse, Backend, DocumentStatusResponse, StatusResponse, UploadRequest,
    UploadResponse, UploadStatus,
};
use cinerate::models::{
    AnalysisResult, AnalysisStatus, CheckStatus, ConfigUpdate, Credential, ErrorLogEntry,
    HealthService, LocalModel, ModelOperation, ProviderConfiguration, ProviderId, ProviderStatus, RemoteModel,
    RemoteStatus, SceneAssessment, SceneValidation, ServiceCheck,
};
use cinerate::{ClientError, ClientResult, RejectionKind};
use tokio::sync::Notify;

use super::builders;

#[derive(Default)]
struct Script {
    configuration: Option<ProviderConfiguration>,
    local_models: Vec<LocalModel>,
    provider_statuses: Option<ClientResult<Vec<ProviderStatus>>>,
    service_health: HashMap<HealthService, ClientResult<ServiceCheck>>,
    uploads: VecDeque<ClientResult<UploadResponse>>,
    document_statuses: VecDeque<ClientResult<DocumentStatusResponse>>,
    analysis_ids: VecDeque<String>,
    statuses: HashMap<String, VecDeque<ClientResult<StatusResponse>>>,
    results: HashMap<String, AnalysisResult>,
    failing_scenes: HashSet<u32>,
    error_log: Vec<ErrorLogEntry>,
    ignore_updates: bool,
    ignore_model_ops: bool,
    mask_stored_keys: bool,
    config_failures: usize,
    uploaded: Vec<UploadRequest>,
}

#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    calls: Mutex<Vec<&'static str>>,
    load_gate: Option<Arc<Notify>>,
    status_gate: Option<Arc<Notify>>,
}

impl ScriptedBackend {
    /// Backend with the default provider configuration and local inventory.
    pub fn new() -> Self {
        let backend = Self::default();
        {
            let mut script = backend.script.lock().unwrap();
            script.configuration =
                Some(builders::configuration(ProviderId::Local, "llama2-7b", None));
            script.local_models = vec![
                builders::local_model("llama2-7b", false),
                builders::local_model("mistral-7b", true),
            ];
        }
        backend
    }

    /// Holds every load/unload until the gate is notified.
    pub fn with_load_gate(mut self) -> Self {
        self.load_gate = Some(Arc::new(Notify::new()));
        self
    }

    /// Holds every status poll until the gate is notified.
    pub fn with_status_gate(mut self) -> Self {
        self.status_gate = Some(Arc::new(Notify::new()));
        self
    }

    pub fn load_gate(&self) -> Arc<Notify> {
        Arc::clone(self.load_gate.as_ref().expect("no load gate"))
    }

    pub fn status_gate(&self) -> Arc<Notify> {
        Arc::clone(self.status_gate.as_ref().expect("no status gate"))
    }

    pub fn set_configuration(&self, configuration: ProviderConfiguration) {
        self.script.lock().unwrap().configuration = Some(configuration);
    }

    pub fn set_local_models(&self, models: Vec<LocalModel>) {
        self.script.lock().unwrap().local_models = models;
    }

    pub fn set_provider_statuses(&self, statuses: ClientResult<Vec<ProviderStatus>>) {
        self.script.lock().unwrap().provider_statuses = Some(statuses);
    }

    pub fn set_service_health(&self, service: HealthService, check: ClientResult<ServiceCheck>) {
        self.script
            .lock()
            .unwrap()
            .service_health
            .insert(service, check);
    }

    pub fn push_upload(&self, response: ClientResult<UploadResponse>) {
        self.script.lock().unwrap().uploads.push_back(response);
    }

    pub fn push_document_status(&self, response: ClientResult<DocumentStatusResponse>) {
        self.script
            .lock()
            .unwrap()
            .document_statuses
            .push_back(response);
    }

    pub fn push_analysis_id(&self, id: &str) {
        self.script
            .lock()
            .unwrap()
            .analysis_ids
            .push_back(id.to_string());
    }

    pub fn push_status(&self, analysis_id: &str, response: ClientResult<StatusResponse>) {
        self.script
            .lock()
            .unwrap()
            .statuses
            .entry(analysis_id.to_string())
            .or_default()
            .push_back(response);
    }

    pub fn set_result(&self, result: AnalysisResult) {
        self.script
            .lock()
            .unwrap()
            .results
            .insert(result.analysis_id.clone(), result);
    }

    pub fn fail_scene(&self, scene_number: u32) {
        self.script
            .lock()
            .unwrap()
            .failing_scenes
            .insert(scene_number);
    }

    pub fn set_error_log(&self, entries: Vec<ErrorLogEntry>) {
        self.script.lock().unwrap().error_log = entries;
    }

    /// Accept configuration updates without applying them.
    pub fn ignore_updates(&self) {
        self.script.lock().unwrap().ignore_updates = true;
    }

    /// Acknowledge load/unload requests without changing the inventory.
    pub fn ignore_model_ops(&self) {
        self.script.lock().unwrap().ignore_model_ops = true;
    }

    /// Store credentials in masked form, as some backends echo them.
    pub fn mask_stored_keys(&self) {
        self.script.lock().unwrap().mask_stored_keys = true;
    }

    /// Fail the next `count` configuration reads.
    pub fn fail_config_reads(&self, count: usize) {
        self.script.lock().unwrap().config_failures = count;
    }

    pub fn uploaded(&self) -> Vec<UploadRequest> {
        self.script.lock().unwrap().uploaded.clone()
    }

    pub fn call_count(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == name)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn record(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
    }

    fn set_loaded(&self, name: &str, loaded: bool) -> ClientResult<ModelOperation> {
        let mut script = self.script.lock().unwrap();
        if script.ignore_model_ops {
            return Ok(ModelOperation {
                model_name: name.to_string(),
                loaded,
                message: Some("accepted".to_string()),
            });
        }
        let model = script
            .local_models
            .iter_mut()
            .find(|model| model.name == name)
            .ok_or_else(|| {
                ClientError::rejected(RejectionKind::NotFound, format!("model '{}'", name))
            })?;
        model.loaded = loaded;
        Ok(ModelOperation {
            model_name: name.to_string(),
            loaded,
            message: None,
        })
    }
}

#[async_trait]
impl Backend for ScriptedBackend {
    async fn upload(&self, request: UploadRequest) -> ClientResult<UploadResponse> {
        self.record("upload");
        let mut script = self.script.lock().unwrap();
        script.uploaded.push(request);
        script.uploads.pop_front().unwrap_or_else(|| {
            Ok(UploadResponse {
                document_id: "doc-1".to_string(),
                status: UploadStatus::Processing,
                processing_details: Default::default(),
            })
        })
    }

    async fn document_status(&self, _document_id: &str) -> ClientResult<DocumentStatusResponse> {
        self.record("document_status");
        self.script
            .lock()
            .unwrap()
            .document_statuses
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Transport("script exhausted".to_string())))
    }

    async fn analyze(
        &self,
        document_id: &str,
        _criteria_document_id: Option<&str>,
    ) -> ClientResult<AnalyzeResponse> {
        self.record("analyze");
        let id = self
            .script
            .lock()
            .unwrap()
            .analysis_ids
            .pop_front()
            .unwrap_or_else(|| "a1".to_string());
        Ok(AnalyzeResponse {
            analysis_id: id,
            document_id: document_id.to_string(),
            status: AnalysisStatus::Pending,
        })
    }

    async fn analysis_status(&self, analysis_id: &str) -> ClientResult<StatusResponse> {
        self.record("analysis_status");
        if let Some(gate) = &self.status_gate {
            gate.notified().await;
        }
        self.script
            .lock()
            .unwrap()
            .statuses
            .get_mut(analysis_id)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Err(ClientError::Transport("script exhausted".to_string())))
    }

    async fn analysis_result(&self, analysis_id: &str) -> ClientResult<AnalysisResult> {
        self.record("analysis_result");
        self.script
            .lock()
            .unwrap()
            .results
            .get(analysis_id)
            .cloned()
            .ok_or_else(|| ClientError::rejected(RejectionKind::NotReady, "still running"))
    }

    async fn validate_scene(
        &self,
        _analysis_id: &str,
        scene: &SceneAssessment,
    ) -> ClientResult<SceneValidation> {
        self.record("validate_scene");
        if self
            .script
            .lock()
            .unwrap()
            .failing_scenes
            .contains(&scene.scene_number)
        {
            return Err(ClientError::Transport("connection reset".to_string()));
        }
        Ok(SceneValidation {
            scene_number: scene.scene_number,
            consistent: scene.scene_number % 2 == 1,
            suggested_rating: None,
            notes: None,
        })
    }

    async fn provider_config(&self) -> ClientResult<ProviderConfiguration> {
        self.record("provider_config");
        let mut script = self.script.lock().unwrap();
        if script.config_failures > 0 {
            script.config_failures -= 1;
            return Err(ClientError::Transport("connection refused".to_string()));
        }
        script
            .configuration
            .clone()
            .ok_or_else(|| ClientError::rejected(RejectionKind::NotFound, "no configuration"))
    }

    async fn update_provider_config(
        &self,
        update: &ConfigUpdate,
    ) -> ClientResult<ProviderConfiguration> {
        self.record("update_provider_config");
        let mut script = self.script.lock().unwrap();
        let ignore = script.ignore_updates;
        let mask = script.mask_stored_keys;
        let configuration = script
            .configuration
            .as_mut()
            .ok_or_else(|| ClientError::rejected(RejectionKind::NotFound, "no configuration"))?;
        if !ignore {
            if let Some(provider) = update.active_provider {
                configuration.active_provider = provider;
            }
            if let Some(model) = &update.active_model {
                configuration.active_model = model.clone();
            }
            for (provider, settings) in &update.providers {
                let entry = configuration.providers.entry(*provider).or_default();
                if settings.api_key.is_some() {
                    entry.api_key = if mask {
                        Some(Credential::new("sk-or-****"))
                    } else {
                        settings.api_key.clone()
                    };
                }
            }
        }
        Ok(configuration.clone())
    }

    async fn provider_statuses(&self) -> ClientResult<Vec<ProviderStatus>> {
        self.record("provider_statuses");
        self.script
            .lock()
            .unwrap()
            .provider_statuses
            .clone()
            .unwrap_or_else(|| {
                Ok(vec![
                    builders::provider_status(ProviderId::Local, true, true),
                    builders::provider_status(ProviderId::OpenRouter, true, true),
                ])
            })
    }

    async fn local_models(&self) -> ClientResult<Vec<LocalModel>> {
        self.record("local_models");
        Ok(self.script.lock().unwrap().local_models.clone())
    }

    async fn load_model(&self, name: &str) -> ClientResult<ModelOperation> {
        self.record("load_model");
        if let Some(gate) = &self.load_gate {
            gate.notified().await;
        }
        self.set_loaded(name, true)
    }

    async fn unload_model(&self, name: &str) -> ClientResult<ModelOperation> {
        self.record("unload_model");
        if let Some(gate) = &self.load_gate {
            gate.notified().await;
        }
        self.set_loaded(name, false)
    }

    async fn remote_status(&self) -> ClientResult<RemoteStatus> {
        self.record("remote_status");
        Ok(RemoteStatus {
            connected: true,
            credits_remaining: Some(12.5),
            credits_used: Some(2.5),
            rate_limit_per_minute: Some(60),
            error: None,
        })
    }

    async fn remote_models(&self) -> ClientResult<Vec<RemoteModel>> {
        self.record("remote_models");
        Ok(vec![RemoteModel {
            id: "gpt-4".to_string(),
            name: "GPT-4".to_string(),
            context_length: Some(8192),
            prompt_price_per_1k: Some(0.03),
            completion_price_per_1k: Some(0.06),
        }])
    }

    async fn service_health(&self, service: HealthService) -> ClientResult<ServiceCheck> {
        self.record("service_health");
        self.script
            .lock()
            .unwrap()
            .service_health
            .get(&service)
            .cloned()
            .unwrap_or_else(|| Ok(builders::service_check(service, CheckStatus::Ok)))
    }

    async fn error_log(&self) -> ClientResult<Vec<ErrorLogEntry>> {
        self.record("error_log");
        Ok(self.script.lock().unwrap().error_log.clone())
    }
}
