//! Builders for backend payloads used across integration tests.

#![allow(dead_code)]

use std::collections::BTreeMap;

use chrono::Utc;

use cinerate::api::{DocumentStatusResponse, StatusResponse, UploadResponse, UploadStatus};
use cinerate::models::{
    AgeRating, AnalysisResult, AnalysisStatus, CheckStatus, Credential, ErrorLogEntry,
    HealthService, LocalModel, ModelConfig, ProcessingStatus, ProviderConfiguration, ProviderId,
    ProviderSettings, ProviderStatus, RatingResult, SceneAssessment, ServiceCheck, Severity,
    StageStatus,
};

pub const VALID_KEY: &str = "sk-or-v1-0123456789abcdef0123456789abcdef";

/// Configuration knowing `llama2-7b`/`mistral-7b` (local) and `gpt-4` (openrouter).
pub fn configuration(
    active_provider: ProviderId,
    active_model: &str,
    openrouter_key: Option<&str>,
) -> ProviderConfiguration {
    let mut providers = BTreeMap::new();
    providers.insert(ProviderId::Local, ProviderSettings::default());
    providers.insert(
        ProviderId::OpenRouter,
        ProviderSettings {
            api_key: openrouter_key.map(Credential::new),
            base_url: Some("https://openrouter.ai/api/v1".to_string()),
            timeout_secs: Some(60),
            max_retries: Some(3),
        },
    );

    let mut models = BTreeMap::new();
    for (name, provider) in [
        ("llama2-7b", ProviderId::Local),
        ("mistral-7b", ProviderId::Local),
        ("gpt-4", ProviderId::OpenRouter),
    ] {
        models.insert(
            name.to_string(),
            ModelConfig {
                provider,
                context_window: Some(4096),
                max_tokens: Some(1024),
                temperature: Some(0.2),
            },
        );
    }

    ProviderConfiguration {
        active_provider,
        active_model: active_model.to_string(),
        providers,
        models,
    }
}

pub fn local_model(name: &str, loaded: bool) -> LocalModel {
    LocalModel {
        name: name.to_string(),
        size_bytes: 3_800_000_000,
        loaded,
        context_window: 4096,
        max_tokens: 1024,
        last_used: None,
        busy: false,
    }
}

pub fn provider_status(provider: ProviderId, available: bool, healthy: bool) -> ProviderStatus {
    ProviderStatus {
        provider,
        available,
        healthy,
        latency_ms: Some(35.0),
        error_message: (!healthy).then(|| "degraded".to_string()),
        last_checked: Utc::now(),
    }
}

pub fn service_check(service: HealthService, status: CheckStatus) -> ServiceCheck {
    ServiceCheck {
        service,
        status,
        message: None,
        latency_ms: Some(4.0),
    }
}

pub fn processing(total: u32, processed: u32, indexing: StageStatus) -> ProcessingStatus {
    ProcessingStatus {
        chunks_total: total,
        chunks_processed: processed,
        embedding_status: if indexing == StageStatus::Pending {
            StageStatus::Processing
        } else {
            StageStatus::Success
        },
        indexing_status: indexing,
        errors: vec![],
    }
}

pub fn upload_response(document_id: &str, details: ProcessingStatus) -> UploadResponse {
    UploadResponse {
        document_id: document_id.to_string(),
        status: UploadStatus::Processing,
        processing_details: details,
    }
}

pub fn document_status(document_id: &str, details: ProcessingStatus) -> DocumentStatusResponse {
    DocumentStatusResponse {
        document_id: document_id.to_string(),
        processing_details: details,
    }
}

pub fn scene(number: u32, rating: AgeRating) -> SceneAssessment {
    let mut categories = BTreeMap::new();
    categories.insert("violence".to_string(), Severity::Mild);
    SceneAssessment {
        scene_number: number,
        heading: format!("INT. APARTMENT - NIGHT ({})", number),
        page_range: None,
        categories,
        flagged_content: vec![],
        age_rating: rating,
        comment: String::new(),
        references: None,
    }
}

pub fn status(
    analysis_status: AnalysisStatus,
    progress: f64,
    scenes: Vec<SceneAssessment>,
) -> StatusResponse {
    let mut response = StatusResponse::new(analysis_status, progress);
    response.partial_scenes = scenes;
    response
}

pub fn rating(final_rating: AgeRating) -> RatingResult {
    RatingResult {
        final_rating,
        target_rating: None,
        confidence: 0.87,
        problem_scenes_count: 1,
        categories_summary: BTreeMap::new(),
    }
}

pub fn analysis_result(analysis_id: &str, final_rating: AgeRating) -> AnalysisResult {
    AnalysisResult {
        analysis_id: analysis_id.to_string(),
        document_id: "script-1".to_string(),
        status: AnalysisStatus::Completed,
        rating_result: rating(final_rating),
        scene_assessments: vec![scene(1, AgeRating::SixPlus), scene(2, final_rating)],
        recommendations: vec!["Shorten the fight in scene 2".to_string()],
        created_at: Some(Utc::now()),
    }
}

pub fn error_entry(id: &str, minutes_ago: i64, resolved: bool) -> ErrorLogEntry {
    ErrorLogEntry {
        id: id.to_string(),
        timestamp: Utc::now() - chrono::Duration::minutes(minutes_ago),
        subsystem: "embedding_service".to_string(),
        message: format!("error {}", id),
        detail: None,
        resolved,
    }
}
