//! JSON/HTTP implementation of [`Backend`].

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::{multipart, Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::BackendConfig;
use crate::error::{ClientError, ClientResult, RejectionKind};
use crate::models::{
    AnalysisResult, ConfigUpdate, ErrorLogEntry, HealthService, LocalModel, ModelOperation,
    ProviderConfiguration, ProviderStatus, RemoteModel, RemoteStatus, SceneAssessment,
    SceneValidation, ServiceCheck,
};
use crate::sanitize;

use super::backend::Backend;
use super::types::{
    AnalyzeRequest, AnalyzeResponse, DocumentStatusResponse, ErrorBody, StatusResponse,
    UploadRequest, UploadResponse,
};

/// Default connect timeout for backend requests (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default receive timeout for backend requests (30 seconds).
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates an HTTP client with fixed timeouts.
fn create_http_client(connect_timeout: Duration, request_timeout: Duration) -> ClientResult<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))
}

fn transport_error(endpoint: &'static str, err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Transport(format!("{} timed out: {}", endpoint, err))
    } else {
        ClientError::Transport(format!("{} failed: {}", endpoint, err))
    }
}

/// Backend reached over HTTP.
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a backend client with the default 30s timeouts.
    pub fn new(base_url: &str) -> ClientResult<Self> {
        Self::with_timeouts(base_url, DEFAULT_CONNECT_TIMEOUT, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
    ) -> ClientResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            ClientError::validation(format!("Invalid backend URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::validation(format!(
                "Backend URL '{}' cannot be used as a base",
                base_url
            )));
        }

        Ok(Self {
            client: create_http_client(connect_timeout, request_timeout)?,
            base_url,
        })
    }

    pub fn from_config(config: &BackendConfig) -> ClientResult<Self> {
        Self::with_timeouts(
            &config.base_url,
            Duration::from_secs(config.connect_timeout_secs),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds an endpoint URL from path segments; segments are percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::validation("Backend URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        segments: &[&str],
    ) -> ClientResult<T> {
        let url = self.endpoint(segments)?;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;
        decode(endpoint, response).await
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        endpoint: &'static str,
        segments: &[&str],
        body: Option<&B>,
    ) -> ClientResult<T> {
        let url = self.endpoint(segments)?;
        debug!("{} {}", method, url);
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request
            .send()
            .await
            .map_err(|e| transport_error(endpoint, e))?;
        decode(endpoint, response).await
    }
}

/// Maps a response onto the typed body or a structured error.
async fn decode<T: DeserializeOwned>(endpoint: &'static str, response: Response) -> ClientResult<T> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(endpoint, e))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.detail)
            .unwrap_or_else(|_| body.clone());
        return Err(ClientError::rejected(
            RejectionKind::from_status(status.as_u16()),
            format!(
                "{} returned {}: {}",
                endpoint,
                status,
                sanitize::truncate_body(&detail)
            ),
        ));
    }

    serde_json::from_str(&body).map_err(|e| ClientError::Protocol {
        endpoint,
        reason: e.to_string(),
    })
}

#[async_trait]
impl Backend for HttpBackend {
    async fn upload(&self, request: UploadRequest) -> ClientResult<UploadResponse> {
        const ENDPOINT: &str = "upload";
        let url = self.endpoint(&["documents", "upload"])?;
        let part = multipart::Part::bytes(request.bytes)
            .file_name(request.filename)
            .mime_str(&request.mime_type)
            .map_err(|e| ClientError::validation(format!("Invalid MIME type: {}", e)))?;
        let form = multipart::Form::new()
            .text("document_type", request.document_type.to_string())
            .part("file", part);

        debug!("POST {}", url);
        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(ENDPOINT, e))?;
        decode(ENDPOINT, response).await
    }

    async fn document_status(&self, document_id: &str) -> ClientResult<DocumentStatusResponse> {
        self.get_json("document status", &["documents", document_id, "status"])
            .await
    }

    async fn analyze(
        &self,
        document_id: &str,
        criteria_document_id: Option<&str>,
    ) -> ClientResult<AnalyzeResponse> {
        let body = AnalyzeRequest {
            document_id,
            criteria_document_id,
        };
        self.send_json(
            reqwest::Method::POST,
            "analyze",
            &["analysis", "analyze"],
            Some(&body),
        )
        .await
    }

    async fn analysis_status(&self, analysis_id: &str) -> ClientResult<StatusResponse> {
        self.get_json("analysis status", &["analysis", analysis_id, "status"])
            .await
    }

    async fn analysis_result(&self, analysis_id: &str) -> ClientResult<AnalysisResult> {
        self.get_json("analysis result", &["analysis", analysis_id, "result"])
            .await
    }

    async fn validate_scene(
        &self,
        analysis_id: &str,
        scene: &SceneAssessment,
    ) -> ClientResult<SceneValidation> {
        let scene_number = scene.scene_number.to_string();
        self.send_json(
            reqwest::Method::POST,
            "scene validation",
            &["analysis", analysis_id, "scenes", &scene_number, "validate"],
            Some(scene),
        )
        .await
    }

    async fn provider_config(&self) -> ClientResult<ProviderConfiguration> {
        self.get_json("provider config", &["llm", "config"]).await
    }

    async fn update_provider_config(
        &self,
        update: &ConfigUpdate,
    ) -> ClientResult<ProviderConfiguration> {
        self.send_json(
            reqwest::Method::PUT,
            "provider config update",
            &["llm", "config"],
            Some(update),
        )
        .await
    }

    async fn provider_statuses(&self) -> ClientResult<Vec<ProviderStatus>> {
        self.get_json("provider statuses", &["llm", "providers", "status"])
            .await
    }

    async fn local_models(&self) -> ClientResult<Vec<LocalModel>> {
        self.get_json("local models", &["llm", "local", "models"])
            .await
    }

    async fn load_model(&self, name: &str) -> ClientResult<ModelOperation> {
        self.send_json::<(), _>(
            reqwest::Method::POST,
            "load model",
            &["llm", "local", "models", name, "load"],
            None,
        )
        .await
    }

    async fn unload_model(&self, name: &str) -> ClientResult<ModelOperation> {
        self.send_json::<(), _>(
            reqwest::Method::POST,
            "unload model",
            &["llm", "local", "models", name, "unload"],
            None,
        )
        .await
    }

    async fn remote_status(&self) -> ClientResult<RemoteStatus> {
        self.get_json("remote status", &["llm", "openrouter", "status"])
            .await
    }

    async fn remote_models(&self) -> ClientResult<Vec<RemoteModel>> {
        self.get_json("remote models", &["llm", "openrouter", "models"])
            .await
    }

    async fn service_health(&self, service: HealthService) -> ClientResult<ServiceCheck> {
        self.get_json("service health", &["health", service.as_str()])
            .await
    }

    async fn error_log(&self) -> ClientResult<Vec<ErrorLogEntry>> {
        self.get_json("error log", &["errors"]).await
    }
}
