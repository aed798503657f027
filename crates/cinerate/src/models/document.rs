//! Uploaded documents and their indexing progress.

use serde::{Deserialize, Serialize};

/// Role of an uploaded document in the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentType {
    /// Normative rating criteria.
    Criteria,
    /// The screenplay under assessment.
    Script,
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentType::Criteria => write!(f, "criteria"),
            DocumentType::Script => write!(f, "script"),
        }
    }
}

/// Status of one backend processing stage (embedding, indexing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    #[default]
    Pending,
    Processing,
    Success,
    Failed,
}

impl StageStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StageStatus::Success | StageStatus::Failed)
    }
}

/// Processing details reported for an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProcessingStatus {
    #[serde(default)]
    pub chunks_total: u32,
    #[serde(default)]
    pub chunks_processed: u32,
    #[serde(default)]
    pub embedding_status: StageStatus,
    #[serde(default)]
    pub indexing_status: StageStatus,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ProcessingStatus {
    /// Indexing finished, successfully or not.
    pub fn is_terminal(&self) -> bool {
        self.indexing_status.is_terminal()
    }

    pub fn is_ready(&self) -> bool {
        self.indexing_status == StageStatus::Success && self.chunks_processed >= self.chunks_total
    }

    /// Chunk progress as a percentage.
    pub fn percent(&self) -> u8 {
        if self.chunks_total == 0 {
            return if self.is_ready() { 100 } else { 0 };
        }
        let processed = self.chunks_processed.min(self.chunks_total) as u64;
        ((processed * 100) / self.chunks_total as u64) as u8
    }
}

/// A document known to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub filename: String,
    pub document_type: DocumentType,
    pub processing: ProcessingStatus,
}

impl Document {
    pub fn is_indexed(&self) -> bool {
        self.processing.is_ready()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processing_percent() {
        let status = ProcessingStatus {
            chunks_total: 200,
            chunks_processed: 50,
            ..Default::default()
        };
        assert_eq!(status.percent(), 25);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_processing_ready_requires_success() {
        let mut status = ProcessingStatus {
            chunks_total: 200,
            chunks_processed: 200,
            embedding_status: StageStatus::Success,
            indexing_status: StageStatus::Processing,
            errors: vec![],
        };
        assert!(!status.is_ready());
        status.indexing_status = StageStatus::Success;
        assert!(status.is_ready());
        assert!(status.is_terminal());
    }

    #[test]
    fn test_stage_status_deserializes_snake_case() {
        let status: StageStatus = serde_json::from_str("\"success\"").unwrap();
        assert_eq!(status, StageStatus::Success);
        assert!(serde_json::from_str::<StageStatus>("\"weird\"").is_err());
    }
}
