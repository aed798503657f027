//! The backend contract consumed by every component.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{
    AnalysisResult, ConfigUpdate, ErrorLogEntry, HealthService, LocalModel, ModelOperation,
    ProviderConfiguration, ProviderStatus, RemoteModel, RemoteStatus, SceneAssessment,
    SceneValidation, ServiceCheck,
};

use super::types::{
    AnalyzeResponse, DocumentStatusResponse, StatusResponse, UploadRequest, UploadResponse,
};

/// Analysis backend. Implementations perform exactly one request per call and
/// never retry.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn upload(&self, request: UploadRequest) -> ClientResult<UploadResponse>;

    async fn document_status(&self, document_id: &str) -> ClientResult<DocumentStatusResponse>;

    async fn analyze(
        &self,
        document_id: &str,
        criteria_document_id: Option<&str>,
    ) -> ClientResult<AnalyzeResponse>;

    async fn analysis_status(&self, analysis_id: &str) -> ClientResult<StatusResponse>;

    async fn analysis_result(&self, analysis_id: &str) -> ClientResult<AnalysisResult>;

    async fn validate_scene(
        &self,
        analysis_id: &str,
        scene: &SceneAssessment,
    ) -> ClientResult<SceneValidation>;

    async fn provider_config(&self) -> ClientResult<ProviderConfiguration>;

    async fn update_provider_config(
        &self,
        update: &ConfigUpdate,
    ) -> ClientResult<ProviderConfiguration>;

    async fn provider_statuses(&self) -> ClientResult<Vec<ProviderStatus>>;

    async fn local_models(&self) -> ClientResult<Vec<LocalModel>>;

    async fn load_model(&self, name: &str) -> ClientResult<ModelOperation>;

    async fn unload_model(&self, name: &str) -> ClientResult<ModelOperation>;

    async fn remote_status(&self) -> ClientResult<RemoteStatus>;

    async fn remote_models(&self) -> ClientResult<Vec<RemoteModel>>;

    async fn service_health(&self, service: HealthService) -> ClientResult<ServiceCheck>;

    async fn error_log(&self) -> ClientResult<Vec<ErrorLogEntry>>;
}
