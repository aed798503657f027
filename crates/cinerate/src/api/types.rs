//! Per-endpoint request and response bodies.
//!
//! Responses are decoded straight into these types; a body that does not fit
//! is rejected at the boundary instead of being passed on as loose JSON.

use serde::{Deserialize, Serialize};

use crate::models::{
    AnalysisStatus, DocumentType, ProcessingStatus, RatingResult, SceneAssessment,
};

/// A file to upload.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub filename: String,
    pub document_type: DocumentType,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Acceptance state of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Uploaded,
    Processing,
    Indexed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub status: UploadStatus,
    #[serde(default)]
    pub processing_details: ProcessingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatusResponse {
    pub document_id: String,
    pub processing_details: ProcessingStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub document_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criteria_document_id: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub analysis_id: String,
    pub document_id: String,
    pub status: AnalysisStatus,
}

/// One poll of a running analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: AnalysisStatus,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub partial_scenes: Vec<SceneAssessment>,
    #[serde(default)]
    pub rating_result: Option<RatingResult>,
    #[serde(default)]
    pub recommendations: Option<Vec<String>>,
    #[serde(default)]
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn new(status: AnalysisStatus, progress: f64) -> Self {
        Self {
            status,
            progress,
            partial_scenes: Vec::new(),
            rating_result: None,
            recommendations: None,
            error: None,
        }
    }
}

/// Error body returned by the backend on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(alias = "error", alias = "message")]
    pub detail: String,
}
